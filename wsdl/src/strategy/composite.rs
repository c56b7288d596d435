use std::{collections::HashMap, rc::Rc};

use super::{ComplexTypeStrategy, DefaultComplexType, Error, Wsdl};

/// Chooses a strategy per type name, falling back to a default one.
#[derive(Clone)]
pub struct Composite {
    type_map: HashMap<String, Rc<dyn ComplexTypeStrategy>>,
    default_strategy: Rc<dyn ComplexTypeStrategy>,
}

impl Default for Composite {
    fn default() -> Self {
        Self::new(Rc::new(DefaultComplexType::default()))
    }
}

impl Composite {
    pub fn new(default_strategy: Rc<dyn ComplexTypeStrategy>) -> Self {
        Self {
            type_map: HashMap::new(),
            default_strategy,
        }
    }

    pub fn connect_type_to_strategy<S: Into<String>>(
        &mut self,
        type_name: S,
        strategy: Rc<dyn ComplexTypeStrategy>,
    ) -> &mut Self {
        self.type_map.insert(type_name.into(), strategy);
        self
    }

    pub fn strategy_of(&self, type_name: &str) -> Rc<dyn ComplexTypeStrategy> {
        Rc::clone(
            self.type_map
                .get(type_name)
                .unwrap_or(&self.default_strategy),
        )
    }
}

impl ComplexTypeStrategy for Composite {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn add_complex_type(&self, context: &mut Wsdl, type_name: &str) -> Result<String, Error> {
        self.strategy_of(type_name)
            .add_complex_type(context, type_name)
    }
}
