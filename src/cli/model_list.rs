//! Model listing
//!
//! Prints the text-generation models discovered at startup and marks the one
//! requests will use.

use crate::core::generation::GenerationClient;
use crate::core::models::{ModelSelection, SelectionError};
use std::error::Error;

/// Lines for a successful selection.
pub fn selection_lines(selection: &ModelSelection) -> Vec<String> {
    let mut lines = vec![
        "🤖 Available Gemini Models".to_string(),
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".to_string(),
        String::new(),
        format!(
            "Found {} models supporting text generation:",
            selection.discovered.len()
        ),
        String::new(),
    ];

    for model in &selection.discovered {
        let marker = if model.name == selection.chosen.name {
            "  ▶ "
        } else {
            "  • "
        };
        lines.push(format!("{marker}{}", model.name));
        if let Some(display_name) = &model.display_name {
            if !display_name.is_empty() && display_name != &model.name {
                lines.push(format!("    Name: {display_name}"));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!("🎯 Using model: {}", selection.chosen.name));
    lines
}

/// Lines for a failed selection, including any names seen before the failure.
pub fn failure_lines(error: &SelectionError) -> Vec<String> {
    let mut lines = vec![format!("❌ {error}")];
    let discovered = error.discovered();
    if !discovered.is_empty() {
        lines.push(String::new());
        lines.push(format!("Models found before the error ({}):", discovered.len()));
        lines.extend(discovered.iter().map(|name| format!("  • {name}")));
    }
    lines
}

pub fn list_models(generator: &GenerationClient) -> Result<(), Box<dyn Error>> {
    match generator.selection() {
        Ok(selection) => {
            for line in selection_lines(selection) {
                println!("{line}");
            }
            Ok(())
        }
        Err(error) => {
            for line in failure_lines(error) {
                eprintln!("{line}");
            }
            Err("No model is available".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ModelDescriptor;

    fn descriptor(name: &str, display: Option<&str>) -> ModelDescriptor {
        ModelDescriptor {
            name: name.to_string(),
            display_name: display.map(str::to_string),
            supports_text_generation: true,
        }
    }

    #[test]
    fn chosen_model_is_marked() {
        let flash = descriptor("models/gemini-1.5-flash", Some("Gemini 1.5 Flash"));
        let selection = ModelSelection {
            chosen: flash.clone(),
            discovered: vec![descriptor("models/gemini-exp", None), flash],
        };

        let lines = selection_lines(&selection);
        assert!(lines.contains(&"  • models/gemini-exp".to_string()));
        assert!(lines.contains(&"  ▶ models/gemini-1.5-flash".to_string()));
        assert!(lines.contains(&"    Name: Gemini 1.5 Flash".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("🎯 Using model: models/gemini-1.5-flash")
        );
    }

    #[test]
    fn failure_lists_partial_discoveries() {
        let error = SelectionError::Listing {
            message: "timed out".to_string(),
            discovered: vec!["models/gemini-pro".to_string()],
        };
        let lines = failure_lines(&error);
        assert_eq!(lines[0], "❌ Error listing models: timed out");
        assert!(lines.contains(&"  • models/gemini-pro".to_string()));

        let lines = failure_lines(&SelectionError::NoUsableModel);
        assert_eq!(lines.len(), 1);
    }
}
