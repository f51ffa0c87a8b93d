use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::hasher::PasswordHasher;
use crate::validation::validate_password;

pub async fn hash(password: String, output_format: OutputFormat) -> anyhow::Result<()> {
    validate_password(&password)?;
    let hash = PasswordHasher.hash_blocking(password).await?;

    match output_format {
        OutputFormat::Json => output_success(output_format, "Password hashed", Some(json!({ "hash": hash }))),
        OutputFormat::Text => {
            println!("{}", hash);
            Ok(())
        }
    }
}
