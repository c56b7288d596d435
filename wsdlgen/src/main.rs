use std::path::PathBuf;

use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wsdlgen::{description::Description, error::Error};

#[derive(StructOpt)]
struct Args {
    /// Where to write the WSDL, stdout when omitted
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Target namespace replacing the one from the description
    #[structopt(long)]
    uri: Option<String>,

    /// JSON service description
    #[structopt(parse(from_os_str))]
    input: PathBuf,
}

#[paw::main]
fn main(args: Args) -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let description = Description::from_path(&args.input)?;
    let mut wsdl = wsdlgen::generate(&description)?;

    if let Some(uri) = &args.uri {
        wsdl.set_uri(uri)?;
    }

    match &args.output {
        Some(path) => {
            wsdl.dump_to_file(path)?;
            info!(path = %path.display(), "wrote WSDL");
        }
        None => wsdl.dump(std::io::stdout().lock())?,
    }

    Ok(())
}
