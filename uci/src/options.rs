use super::commands::UciInput;

#[derive(Debug, Clone)]
pub struct UciOption {
    pub name: &'static str,
    pub option_type: UciOptionType,
}

#[derive(Debug, Clone)]
pub enum UciOptionType {
    Spin { min: i64, max: i64 },
    Check,
}

impl UciOptionType {
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match self {
            UciOptionType::Spin { min, max } => {
                let parsed = value
                    .parse::<i64>()
                    .map_err(|e| format!("Invalid integer: {}", e))?;
                if parsed < *min || parsed > *max {
                    return Err(format!("Value {} out of range [{}, {}]", parsed, min, max));
                }
                Ok(())
            }
            UciOptionType::Check => match value.to_lowercase().as_str() {
                "true" | "false" => Ok(()),
                _ => Err("Boolean value must be 'true' or 'false'".to_string()),
            },
        }
    }
}

impl UciOption {
    /// Builds the `setoption` command for this option, validating the value first.
    pub fn to_setoption<T>(&self, value: &T) -> Result<UciInput, String>
    where
        T: ToString,
    {
        let value = value.to_string();
        self.option_type.validate(&value)?;

        Ok(UciInput::SetOption {
            name: self.name.to_string(),
            value,
        })
    }
}
