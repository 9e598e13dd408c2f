//! 配置校验模块
//!
//! 校验规则：
//! - page name 非空且唯一
//! - statistics 块中的字段名与取值合法
//! - sink name 非空且唯一
//! - hostname 若设置则非空

use std::collections::HashSet;

use contracts::{AgentBlueprint, ConfigItem, ContractError};
use field_selector::EnabledFieldSet;

/// 校验 AgentBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &AgentBlueprint) -> Result<(), ContractError> {
    validate_hostname(blueprint)?;
    validate_page_names(blueprint)?;
    validate_statistics(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// 校验 hostname
fn validate_hostname(blueprint: &AgentBlueprint) -> Result<(), ContractError> {
    if blueprint.hostname.as_deref().is_some_and(str::is_empty) {
        return Err(ContractError::config_validation(
            "hostname",
            "hostname cannot be empty when set",
        ));
    }
    if blueprint.plugin.is_empty() {
        return Err(ContractError::config_validation(
            "plugin",
            "plugin cannot be empty",
        ));
    }
    Ok(())
}

/// 校验 page name 唯一性
fn validate_page_names(blueprint: &AgentBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, page) in blueprint.pages.iter().enumerate() {
        if page.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("pages[{}].name", idx),
                "page name cannot be empty",
            ));
        }
        if !seen.insert(&page.name) {
            return Err(ContractError::config_validation(
                format!("pages[name={}]", page.name),
                "duplicate page name",
            ));
        }
    }
    Ok(())
}

/// 校验 statistics 块 (与运行时使用同一套解析)
fn validate_statistics(blueprint: &AgentBlueprint) -> Result<(), ContractError> {
    for page in &blueprint.pages {
        let Some(block) = &page.statistics else {
            continue;
        };

        let item = ConfigItem::from_block("statistics", block);
        if let Err(e) = EnabledFieldSet::from_config(&item) {
            return Err(ContractError::ConfigValidation {
                field: format!("pages[{}].statistics", page.name),
                message: e.to_string(),
                source: Some(Box::new(e)),
            });
        }
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &AgentBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}
