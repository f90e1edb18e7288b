
use crate::cli::OutputFormat;
use crate::handlers::public::roles::ROLES;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ROLES)?);
        }
        OutputFormat::Text => {
            for role in ROLES.iter() {
                println!("{:<12} {}", role.nome, role.descricao);
            }
        }
    }
    Ok(())
}
