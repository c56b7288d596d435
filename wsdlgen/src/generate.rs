use tracing::debug;
use url::Url;
use wsdlgen_wsdl::{
    primitive_xsd_type, ElementDescriptor, MessagePart, Wsdl, HTTP_TRANSPORT,
    SOAP_ENCODING_NAMESPACE,
};

use super::{
    description::{Description, Operation, Style},
    error::Error,
};

/// Names of the messages generated for one operation.
struct OperationMessages {
    input: String,
    output: Option<String>,
    fault: Option<String>,
}

fn needs_schema(description: &Description) -> bool {
    description.style == Style::Document
        || !description.elements.is_empty()
        || description.operations.iter().any(|operation| {
            operation
                .params
                .iter()
                .map(|param| param.ty.as_str())
                .chain(Some(operation.returns.as_str()))
                .chain(operation.fault.as_deref())
                .any(|ty| primitive_xsd_type(ty).is_none())
        })
}

fn add_rpc_messages(wsdl: &mut Wsdl, operation: &Operation) -> Result<OperationMessages, Error> {
    let input = format!("{}In", operation.name);
    let mut parts = Vec::with_capacity(operation.params.len());
    for param in &operation.params {
        parts.push((param.name.clone(), wsdl.resolve_xsd_type(&param.ty)?));
    }
    wsdl.add_message(&input, parts);

    let returns = wsdl.resolve_xsd_type(&operation.returns)?;
    let output = if returns.is_empty() {
        None
    } else {
        let output = format!("{}Out", operation.name);
        wsdl.add_message(&output, [("return", returns)]);
        Some(output)
    };

    Ok(OperationMessages {
        input,
        output,
        fault: None,
    })
}

fn typed_element(wsdl: &mut Wsdl, name: &str, ty: &str) -> Result<ElementDescriptor, Error> {
    let ty = wsdl.resolve_xsd_type(ty)?;
    let element = ElementDescriptor::new(name);

    Ok(if ty.is_empty() {
        element
    } else {
        element.attribute("type", ty)
    })
}

fn add_document_messages(
    wsdl: &mut Wsdl,
    operation: &Operation,
) -> Result<OperationMessages, Error> {
    let mut params = Vec::with_capacity(operation.params.len());
    for param in &operation.params {
        params.push(typed_element(wsdl, &param.name, &param.ty)?);
    }

    let request = wsdl.add_element(&ElementDescriptor::new(&operation.name).sequence(params))?;
    let input = format!("{}In", operation.name);
    wsdl.add_message(&input, [("parameters", MessagePart::element(request))]);

    let mut results = Vec::new();
    if primitive_xsd_type(&operation.returns) != Some("") {
        let result_name = format!("{}Result", operation.name);
        results.push(typed_element(wsdl, &result_name, &operation.returns)?);
    }

    let response_name = format!("{}Response", operation.name);
    let response = wsdl.add_element(&ElementDescriptor::new(&response_name).sequence(results))?;
    let output = format!("{}Out", operation.name);
    wsdl.add_message(&output, [("parameters", MessagePart::element(response))]);

    Ok(OperationMessages {
        input,
        output: Some(output),
        fault: None,
    })
}

fn add_fault_message(wsdl: &mut Wsdl, operation: &Operation) -> Result<Option<String>, Error> {
    let ty = match &operation.fault {
        Some(ty) => wsdl.resolve_xsd_type(ty)?,
        None => return Ok(None),
    };

    let fault = format!("{}Fault", operation.name);
    wsdl.add_message(&fault, [("fault", ty)]);
    Ok(Some(fault))
}

fn tns(name: &str) -> String {
    format!("tns:{}", name)
}

/// Builds the complete WSDL for `description`: messages, one port type, one
/// SOAP binding and one service.
pub fn generate(description: &Description) -> Result<Wsdl, Error> {
    let location = Url::parse(&description.location)?;

    let mut wsdl = Wsdl::with_strategy(
        &description.name,
        &description.uri,
        description.strategy(),
        description.class_map.clone(),
    )?;

    if let Some(documentation) = &description.documentation {
        let root = wsdl.root();
        wsdl.add_documentation(root, documentation);
    }

    // `types` has to precede the messages that reference it.
    if needs_schema(description) {
        wsdl.schema();
    }

    for element in &description.elements {
        wsdl.add_element(&ElementDescriptor::from_value(element)?)?;
    }

    let mut messages = Vec::with_capacity(description.operations.len());
    for operation in &description.operations {
        let mut operation_messages = match description.style {
            Style::Rpc => add_rpc_messages(&mut wsdl, operation)?,
            Style::Document => add_document_messages(&mut wsdl, operation)?,
        };
        operation_messages.fault = add_fault_message(&mut wsdl, operation)?;
        messages.push(operation_messages);
    }

    let port_type_name = format!("{}Port", description.name);
    let binding_name = format!("{}Binding", description.name);
    let service_name = format!("{}Service", description.name);

    let port_type = wsdl.add_port_type(&port_type_name);
    for (operation, names) in description.operations.iter().zip(&messages) {
        let node = wsdl.add_port_operation(
            port_type,
            &operation.name,
            Some(tns(&names.input).as_str()),
            names.output.as_deref().map(tns).as_deref(),
            names.fault.as_deref().map(tns).as_deref(),
        );

        if let Some(documentation) = &operation.documentation {
            wsdl.add_documentation(node, documentation);
        }
    }

    let binding = wsdl.add_binding(&binding_name, &tns(&port_type_name));
    wsdl.add_soap_binding(binding, description.style.binding_style(), HTTP_TRANSPORT);

    let body: Vec<(&str, &str)> = match description.style {
        Style::Rpc => vec![
            ("use", "encoded"),
            ("encodingStyle", SOAP_ENCODING_NAMESPACE),
            ("namespace", description.uri.as_str()),
        ],
        Style::Document => vec![("use", "literal")],
    };

    for (operation, names) in description.operations.iter().zip(&messages) {
        let fault = names
            .fault
            .as_deref()
            .map(|fault| {
                let mut attributes = vec![("name", fault)];
                attributes.extend(body.iter().copied());
                attributes
            });

        let node = wsdl.add_binding_operation(
            binding,
            &operation.name,
            Some(body.as_slice()),
            names.output.as_ref().map(|_| body.as_slice()),
            fault.as_deref(),
        );
        wsdl.add_soap_operation(node, &format!("{}#{}", description.uri, operation.name));
    }

    wsdl.add_service(
        &service_name,
        &port_type_name,
        &tns(&binding_name),
        location.as_str(),
    );

    debug!(
        name = %description.name,
        operations = description.operations.len(),
        "generated WSDL"
    );

    Ok(wsdl)
}
