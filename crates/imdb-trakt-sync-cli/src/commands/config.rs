use super::RunContext;
use crate::output::{new_table, Output};
use crate::ConfigCommands;
use color_eyre::Result;
use serde_json::Value;

pub fn run_config(ctx: &RunContext, cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(ctx, output),
    }
}

fn show_config(ctx: &RunContext, output: &Output) -> Result<()> {
    let path = ctx.config_file();
    if !path.exists() {
        output.warn(format!(
            "No config file at {}; using environment variables only",
            path.display()
        ));
    }

    let config = ctx.load_config()?;
    let summary = config.masked_summary();

    output.render(&summary, || {
        let mut table = new_table(["Setting", "Value"]);
        table.add_row(vec!["config file".to_string(), path.display().to_string()]);
        for (key, value) in flatten("", &summary) {
            table.add_row(vec![key, value]);
        }
        table
    });
    Ok(())
}

/// `{"imdb": {"base_url": ..}}` becomes `("imdb.base_url", ..)`
fn flatten(prefix: &str, value: &Value) -> Vec<(String, String)> {
    match value {
        Value::Object(map) => map
            .iter()
            .flat_map(|(key, inner)| {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&path, inner)
            })
            .collect(),
        Value::String(s) => vec![(prefix.to_string(), s.clone())],
        other => vec![(prefix.to_string(), other.to_string())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_sections() {
        let rows = flatten("", &json!({"imdb": {"base_url": "https://www.imdb.com"}, "trace": false}));
        assert!(rows.contains(&("imdb.base_url".to_string(), "https://www.imdb.com".to_string())));
        assert!(rows.contains(&("trace".to_string(), "false".to_string())));
    }
}
