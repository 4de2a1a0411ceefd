//! Line-oriented terminal input.

use std::io::{self, Write};

use anyhow::{bail, Result};

/// Read one trimmed line after printing `label`.
pub fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        bail!("Input closed");
    }
    Ok(input.trim().to_string())
}

/// Like `prompt`, but an empty answer keeps `default`.
pub fn prompt_with_default(label: &str, default: &str) -> Result<String> {
    if default.is_empty() {
        return prompt(label);
    }
    let input = prompt(&format!("{} [{}]", label, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

pub fn prompt_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(format!("{}: ", label))?;
    Ok(password)
}

/// Yes/no question. An empty answer picks `default_yes`.
pub fn confirm(question: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]", question, hint))?.to_lowercase();
    Ok(match input.as_str() {
        "" => default_yes,
        "y" | "yes" => true,
        _ => false,
    })
}
