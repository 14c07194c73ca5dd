//! Structured errors of the placeholder substitution engine.

use std::fmt;

/// Template substitution errors with enough context to explain them.
#[derive(Debug)]
pub enum TemplateError {
    /// The template references a placeholder that resolved to no content.
    VariableNotFound {
        variable: String,
        available_variables: Box<Vec<String>>,
        suggestions: Box<Vec<String>>,
        location: Box<ErrorLocation>,
    },

    /// The template markup could not be parsed by the engine.
    SyntaxError {
        message: String,
        location: Box<ErrorLocation>,
    },
}

/// Where a template error occurred
#[derive(Debug, Clone, Default)]
pub struct ErrorLocation {
    /// Template file name
    pub template_name: String,
    /// Line number if the engine reported one
    pub line_number: Option<usize>,
    /// Lines around the error (1-indexed line number, content)
    pub context_lines: Option<Vec<(usize, String)>>,
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VariableNotFound {
                variable,
                ..
            } => write!(f, "missing placeholder '{variable}'"),
            Self::SyntaxError {
                message,
                ..
            } => write!(f, "template syntax error: {message}"),
        }
    }
}

impl std::error::Error for TemplateError {}

impl TemplateError {
    /// Name of the missing placeholder, if that is the failure.
    pub fn missing_variable(&self) -> Option<&str> {
        match self {
            Self::VariableNotFound {
                variable,
                ..
            } => Some(variable),
            Self::SyntaxError {
                ..
            } => None,
        }
    }

    /// Multi-line, user-facing description with suggestions.
    pub fn format_with_context(&self) -> String {
        match self {
            Self::VariableNotFound {
                variable,
                available_variables,
                suggestions,
                location,
            } => format_variable_not_found_error(variable, available_variables, suggestions, location),
            Self::SyntaxError {
                message,
                location,
            } => format_syntax_error(message, location),
        }
    }
}

fn format_variable_not_found_error(
    variable: &str,
    available_variables: &[String],
    suggestions: &[String],
    location: &ErrorLocation,
) -> String {
    let mut msg = String::new();

    msg.push_str("ERROR: Template Placeholder Not Found\n\n");
    msg.push_str(&format!("Placeholder: {variable}\n"));
    msg.push_str(&format!("Template: {}\n", location.template_name));
    if let Some(line) = location.line_number {
        msg.push_str(&format!("Line: {line}\n"));
    }
    msg.push('\n');

    if !suggestions.is_empty() {
        msg.push_str("Did you mean one of these?\n");
        for suggestion in suggestions {
            msg.push_str(&format!("  - {suggestion}\n"));
        }
        msg.push('\n');
    }

    if !available_variables.is_empty() {
        msg.push_str("Placeholders defined for this email:\n");
        for var in available_variables.iter().take(10) {
            msg.push_str(&format!("  {var}\n"));
        }
        if available_variables.len() > 10 {
            msg.push_str(&format!("  ... and {} more\n", available_variables.len() - 10));
        }
        msg.push('\n');
    }

    msg.push_str("SUGGESTION: Define the placeholder in the email source or its global source,\n");
    msg.push_str("or render with strict mode disabled to leave it empty.\n");
    msg
}

fn format_syntax_error(message: &str, location: &ErrorLocation) -> String {
    let mut msg = String::new();

    msg.push_str("ERROR: Template Syntax Error\n\n");
    msg.push_str(&format!("Error: {message}\n"));
    msg.push_str(&format!("Template: {}\n", location.template_name));

    if let Some(line) = location.line_number {
        msg.push_str(&format!("Line: {line}\n"));
    }

    if let Some(lines) = &location.context_lines {
        msg.push('\n');
        for (number, line) in lines {
            let marker = if Some(*number) == location.line_number {
                ">"
            } else {
                " "
            };
            msg.push_str(&format!("{marker} {number:>4} | {line}\n"));
        }
    }

    msg.push_str("\nSUGGESTION: Check the template for unclosed {{ }} delimiters.\n");
    msg
}
