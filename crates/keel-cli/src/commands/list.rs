use std::collections::BTreeMap;

use keel_conf::Configuration;

/// Every property under `prefix`, expanded unless `raw`. A value that cannot be expanded
/// (a placeholder cycle) is shown as the error text instead of aborting the listing.
pub(super) fn collect(
    conf: &Configuration,
    raw: bool,
    prefix: Option<&str>,
) -> BTreeMap<String, String> {
    conf.to_map()
        .into_iter()
        .filter(|(key, _)| prefix.is_none_or(|p| key.starts_with(p)))
        .map(|(key, value)| {
            if raw {
                return (key, value);
            }
            let shown = conf.get(&key).unwrap_or_else(|e| format!("<{e}>"));
            (key, shown)
        })
        .collect()
}

pub(super) fn cmd_list(
    conf: &Configuration,
    json: bool,
    raw: bool,
    prefix: Option<&str>,
) -> keel_core::Result<()> {
    let entries = collect(conf, raw, prefix);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&entries)
                .map_err(|e| keel_core::KeelError::Other(e.into()))?
        );
    } else {
        let width = entries.keys().map(String::len).max().unwrap_or(0);
        for (key, value) in &entries {
            println!("{key:<width$} = {value}");
        }
    }
    Ok(())
}

pub(super) fn cmd_check(conf: &Configuration) -> keel_core::Result<()> {
    println!("🩺 Keel Check — Configuration Audit");
    println!();

    for layer in conf.layers() {
        match &layer.path {
            Some(path) => println!(
                "  {:<9} {} ({} keys, {})",
                layer.origin.to_string(),
                layer.name,
                layer.keys,
                path.display()
            ),
            None => println!(
                "  {:<9} {} ({} keys)",
                layer.origin.to_string(),
                layer.name,
                layer.keys
            ),
        }
    }

    conf.validate()?;

    let unresolved: Vec<String> = collect(conf, false, None)
        .into_iter()
        .filter(|(_, v)| v.contains("${") || v.starts_with('<'))
        .map(|(k, _)| k)
        .collect();

    println!();
    for key in &unresolved {
        println!("  ⚠️  {key}: value still contains unresolved placeholders");
    }
    println!(
        "  ✅ {} properties, {} layers, validation passed, ⚠️  {} unresolved",
        conf.len(),
        conf.layers().len(),
        unresolved.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_expands_and_filters() {
        let conf = Configuration::empty();
        conf.merge([
            ("keel.home", "/opt/keel"),
            ("keel.conf.dir", "${keel.home}/conf"),
            ("other", "x"),
        ])
        .unwrap();

        let expanded = collect(&conf, false, Some("keel."));
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded["keel.conf.dir"], "/opt/keel/conf");

        let raw = collect(&conf, true, None);
        assert_eq!(raw.len(), 3);
        assert_eq!(raw["keel.conf.dir"], "${keel.home}/conf");
    }

    #[test]
    fn test_collect_shows_cycle_error() {
        let conf = Configuration::empty();
        conf.merge([("a", "${b}"), ("b", "${a}")]).unwrap();
        let entries = collect(&conf, false, None);
        assert!(entries["a"].contains("cyclic placeholder reference"));
    }
}
