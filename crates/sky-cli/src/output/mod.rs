use serde::Serialize;

use crate::cli::OutputFormat;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Serialize;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Sample {
        handle: &'static str,
        ready: bool,
    }

    #[test]
    fn raw_is_single_line() {
        let rendered = render(
            &Sample {
                handle: "alice.test",
                ready: true,
            },
            OutputFormat::Raw,
        )
        .expect("render");
        assert_eq!(rendered, r#"{"handle":"alice.test","ready":true}"#);
    }

    #[test]
    fn json_is_pretty() {
        let rendered = render(
            &Sample {
                handle: "alice.test",
                ready: false,
            },
            OutputFormat::Json,
        )
        .expect("render");
        assert!(rendered.contains('\n'));
        assert!(rendered.contains(r#""ready": false"#));
    }
}
