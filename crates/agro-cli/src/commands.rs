//! Interactive command parsing

use std::path::PathBuf;

use agro_core::Field;

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Set { field: Field, value: String },
    Unset(Field),
    Show,
    Predict,
    Auto(bool),
    Locate,
    History,
    ClearHistory,
    Chart,
    Export { dir: Option<PathBuf> },
    Copy { detailed: bool },
    Reset,
    Disease { path: PathBuf },
    Health,
    Help,
    Exit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ReplCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    // `temperature=25` or `temperature = 25` is shorthand for `set temperature 25`
    if let Some((field, value)) = line.split_once('=') {
        let field = field.trim();
        if !field.is_empty() && !field.contains(char::is_whitespace) {
            return Ok(Some(ReplCommand::Set {
                field: field.parse()?,
                value: value.trim().to_string(),
            }));
        }
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_lowercase().as_str() {
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "Usage: set <field> <value>".to_string())?;
            ReplCommand::Set {
                field: field.parse()?,
                value: value.trim().to_string(),
            }
        }
        "unset" | "clear" => {
            if rest.is_empty() {
                return Err("Usage: unset <field>".to_string());
            }
            ReplCommand::Unset(rest.parse()?)
        }
        "show" | "form" => ReplCommand::Show,
        "predict" | "submit" => ReplCommand::Predict,
        "auto" => match rest.to_lowercase().as_str() {
            "on" | "true" | "yes" => ReplCommand::Auto(true),
            "off" | "false" | "no" => ReplCommand::Auto(false),
            _ => return Err("Usage: auto on|off".to_string()),
        },
        "locate" | "location" => ReplCommand::Locate,
        "history" => match rest {
            "" => ReplCommand::History,
            "clear" => ReplCommand::ClearHistory,
            _ => return Err("Usage: history [clear]".to_string()),
        },
        "chart" | "charts" => ReplCommand::Chart,
        "export" => ReplCommand::Export {
            dir: (!rest.is_empty()).then(|| PathBuf::from(rest)),
        },
        "copy" => match rest {
            "" => ReplCommand::Copy { detailed: false },
            "full" => ReplCommand::Copy { detailed: true },
            _ => return Err("Usage: copy [full]".to_string()),
        },
        "reset" => ReplCommand::Reset,
        "disease" => {
            if rest.is_empty() {
                return Err("Usage: disease <image path>".to_string());
            }
            ReplCommand::Disease {
                path: PathBuf::from(rest),
            }
        }
        "health" | "status" => ReplCommand::Health,
        "help" | "?" => ReplCommand::Help,
        "exit" | "quit" => ReplCommand::Exit,
        other => return Err(format!("Unknown command '{}'. Type 'help' for commands.", other)),
    };

    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn test_set_forms() {
        let expected = Some(ReplCommand::Set {
            field: Field::WaterFlow,
            value: "45".to_string(),
        });
        assert_eq!(parse_command("set water_flow 45"), Ok(expected.clone()));
        assert_eq!(parse_command("SET water-flow   45 "), Ok(expected.clone()));
        assert_eq!(parse_command("water_flow=45"), Ok(expected.clone()));
        assert_eq!(parse_command("water_flow = 45"), Ok(expected.clone()));
        assert_eq!(parse_command("  water-flow= 45"), Ok(expected));
    }

    #[test]
    fn test_equals_inside_arguments_is_not_shorthand() {
        assert_eq!(
            parse_command("disease ./leaf=1.jpg"),
            Ok(Some(ReplCommand::Disease {
                path: PathBuf::from("./leaf=1.jpg")
            }))
        );
        assert_eq!(
            parse_command("rainfall = 10"),
            Err("Unknown field 'rainfall'".to_string())
        );
    }

    #[test]
    fn test_set_errors() {
        assert!(parse_command("set humidity").is_err());
        assert_eq!(
            parse_command("set rainfall 10"),
            Err("Unknown field 'rainfall'".to_string())
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_command("predict"), Ok(Some(ReplCommand::Predict)));
        assert_eq!(parse_command("auto on"), Ok(Some(ReplCommand::Auto(true))));
        assert_eq!(parse_command("history clear"), Ok(Some(ReplCommand::ClearHistory)));
        assert_eq!(parse_command("export"), Ok(Some(ReplCommand::Export { dir: None })));
        assert_eq!(parse_command("copy full"), Ok(Some(ReplCommand::Copy { detailed: true })));
        assert_eq!(parse_command("quit"), Ok(Some(ReplCommand::Exit)));
        assert!(parse_command("auto maybe").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn test_disease_path_keeps_spaces() {
        assert_eq!(
            parse_command("disease ./images/tomato leaf.jpg"),
            Ok(Some(ReplCommand::Disease {
                path: PathBuf::from("./images/tomato leaf.jpg")
            }))
        );
    }
}
