//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use contracts::{AgentBlueprint, ConfigItem, PageConfig};
use field_selector::EnabledFieldSet;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hostname: Option<String>,
    plugin: String,
    pages: Vec<PageInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct PageInfo {
    name: String,
    plugin_instance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance_prefix: Option<String>,
    collecting: bool,
    enabled_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<&'static str>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&blueprint, args)?;
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info, args);
    }

    Ok(())
}

/// Selector of a page, as the dispatcher will build it
fn page_selector(page: &PageConfig) -> Result<Option<EnabledFieldSet>> {
    let statistics = page
        .statistics
        .as_ref()
        .map(|block| ConfigItem::from_block("statistics", block));
    EnabledFieldSet::from_optional(statistics.as_ref())
        .with_context(|| format!("Invalid statistics for page '{}'", page.name))
}

fn build_config_info(blueprint: &AgentBlueprint, args: &InfoArgs) -> Result<ConfigInfo> {
    let mut pages = Vec::with_capacity(blueprint.pages.len());
    for page in &blueprint.pages {
        let selector = page_selector(page)?;
        let fields = match (&selector, args.fields) {
            (Some(set), true) => set.enabled_fields().map(|(_, f)| f.name).collect(),
            _ => Vec::new(),
        };

        pages.push(PageInfo {
            name: page.name.clone(),
            plugin_instance: page.effective_plugin_instance().to_string(),
            url: page.url.clone(),
            instance_prefix: page.instance_prefix.clone(),
            collecting: selector.is_some(),
            enabled_count: selector.map_or(0, |s| s.enabled_count()),
            fields,
        });
    }

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(ConfigInfo {
        version: format!("{:?}", blueprint.version),
        hostname: blueprint.hostname.clone(),
        plugin: blueprint.plugin.clone(),
        pages,
        sinks,
    })
}

fn print_config_info(info: &ConfigInfo, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               curl-stats Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📍 Agent");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Plugin: {}", info.plugin);
    match &info.hostname {
        Some(hostname) => println!("   └─ Hostname: {}", hostname),
        None => println!("   └─ Hostname: (sink default)"),
    }

    println!("\n🌐 Pages ({})", info.pages.len());
    for (i, page) in info.pages.iter().enumerate() {
        let is_last = i == info.pages.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        match &page.url {
            Some(url) => println!("   {} {} ({})", prefix, page.name, url),
            None => println!("   {} {}", prefix, page.name),
        }

        if !page.collecting {
            println!("   {}  └─ statistics disabled", child_prefix);
        } else if args.fields && !page.fields.is_empty() {
            println!("   {}  📊 Fields ({}):", child_prefix, page.enabled_count);
            for (j, field) in page.fields.iter().enumerate() {
                let field_prefix = if j == page.fields.len() - 1 { "└─" } else { "├─" };
                println!("   {}     {} {}", child_prefix, field_prefix, field);
            }
        } else {
            println!("   {}  └─ {} fields", child_prefix, page.enabled_count);
        }
    }

    if !info.sinks.is_empty() {
        println!("\n📤 Sinks ({})", info.sinks.len());
        for (i, sink) in info.sinks.iter().enumerate() {
            let is_last = i == info.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!("   {} {} ({})", prefix, sink.name, sink.sink_type);
        }
    }

    println!();
}
