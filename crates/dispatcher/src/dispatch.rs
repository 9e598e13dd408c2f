//! Dispatch - turn one completed transfer into metric samples

use contracts::{
    ContractError, FieldDescriptor, MetricSample, MetricSink, PageConfig, TransferStats,
};
use field_selector::EnabledFieldSet;
use tracing::{debug, error, instrument};

/// Metadata copied onto every emitted sample
///
/// Unset fields stay unset on the sample rather than becoming empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchMeta {
    pub host: Option<String>,
    pub plugin: Option<String>,
    pub plugin_instance: Option<String>,
    /// Prepended to the field name to form the type instance
    pub instance_prefix: Option<String>,
}

impl DispatchMeta {
    fn sample(&self, field: &FieldDescriptor, value: f64) -> MetricSample {
        let type_instance = match self.instance_prefix.as_deref() {
            Some(prefix) => format!("{prefix}{}", field.name),
            None => field.name.to_string(),
        };

        MetricSample {
            host: self.host.clone(),
            plugin: self.plugin.clone(),
            plugin_instance: self.plugin_instance.clone(),
            metric_type: field.metric_type,
            type_instance,
            value,
        }
    }
}

/// Read one field from the source and apply its unit conversion
fn extract(stats: &dyn TransferStats, field: &'static FieldDescriptor) -> Result<f64, ContractError> {
    field.kind.read(stats, field.key).map_err(|source| ContractError::Extraction {
        field: field.name,
        source,
    })
}

/// Emit one sample per enabled field, in registry order
///
/// A `None` selector means statistics are disabled and yields zero samples.
/// The first extraction or emission failure aborts the call; samples already
/// handed to the sink stay emitted.
///
/// Returns the number of samples emitted.
///
/// # Errors
/// - `InvalidArgument` if `stats` is `None` while a selector is present
/// - `Extraction` naming the field the source could not provide
/// - `Emission` naming the field the sink rejected
#[instrument(
    name = "dispatch_transfer_stats",
    skip_all,
    fields(sink = %sink.name(), plugin_instance = ?meta.plugin_instance)
)]
pub fn dispatch<S>(
    selector: Option<&EnabledFieldSet>,
    stats: Option<&dyn TransferStats>,
    meta: &DispatchMeta,
    sink: &mut S,
) -> Result<usize, ContractError>
where
    S: MetricSink + ?Sized,
{
    let Some(selector) = selector else {
        return Ok(0);
    };
    let stats = stats
        .ok_or_else(|| ContractError::invalid_argument("no transfer statistics source supplied"))?;

    let mut emitted = 0;
    for (_, field) in selector.enabled_fields() {
        let value = extract(stats, field).inspect_err(|e| {
            error!(field = field.name, error = %e, "Statistics extraction failed");
        })?;

        let sample = meta.sample(field, value);
        sink.submit(&sample).map_err(|e| {
            error!(field = field.name, sink = %sink.name(), error = %e, "Sample rejected");
            ContractError::Emission {
                field: field.name.to_string(),
                sink_name: sink.name().to_string(),
                message: e.to_string(),
            }
        })?;

        debug!(
            type_instance = %sample.type_instance,
            metric_type = %sample.metric_type,
            value = sample.value,
            "Sample dispatched"
        );
        emitted += 1;
    }

    Ok(emitted)
}

/// Statistics selection and sample metadata of one monitored page
#[derive(Debug, Clone)]
pub struct PageStats {
    name: String,
    selector: Option<EnabledFieldSet>,
    meta: DispatchMeta,
}

impl PageStats {
    pub fn new(name: impl Into<String>, selector: Option<EnabledFieldSet>, meta: DispatchMeta) -> Self {
        Self {
            name: name.into(),
            selector,
            meta,
        }
    }

    /// Build from a page configuration
    ///
    /// # Errors
    /// Selector errors (`UnknownField`, `InvalidValue`) for the page's statistics block
    pub fn from_page(
        page: &PageConfig,
        host: Option<&str>,
        plugin: &str,
    ) -> Result<Self, ContractError> {
        let statistics = page
            .statistics
            .as_ref()
            .map(|block| contracts::ConfigItem::from_block("statistics", block));
        let selector = EnabledFieldSet::from_optional(statistics.as_ref())?;

        let meta = DispatchMeta {
            host: host.map(str::to_string),
            plugin: Some(plugin.to_string()),
            plugin_instance: Some(page.effective_plugin_instance().to_string()),
            instance_prefix: page.instance_prefix.clone(),
        };

        Ok(Self::new(&page.name, selector, meta))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn selector(&self) -> Option<&EnabledFieldSet> {
        self.selector.as_ref()
    }

    pub fn meta(&self) -> &DispatchMeta {
        &self.meta
    }

    /// Dispatch the statistics of one completed transfer of this page
    pub fn dispatch<S>(&self, stats: &dyn TransferStats, sink: &mut S) -> Result<usize, ContractError>
    where
        S: MetricSink + ?Sized,
    {
        dispatch(self.selector.as_ref(), Some(stats), &self.meta, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;
    use contracts::{
        ConfigBlock, ConfigItem, ExtractionKind, InfoKey, MetricType, StatsError,
        TransferSnapshot, FIELDS,
    };

    fn selector(entries: &[(&str, bool)]) -> EnabledFieldSet {
        let config = entries.iter().fold(ConfigItem::new("statistics"), |item, (k, v)| {
            item.with_child(ConfigItem::leaf(*k, *v))
        });
        EnabledFieldSet::from_config(&config).unwrap()
    }

    fn full_snapshot() -> TransferSnapshot {
        FIELDS.iter().fold(TransferSnapshot::new(), |snap, field| match field.kind {
            ExtractionKind::IntegerCount => snap.with_long(field.key, 7),
            _ => snap.with_double(field.key, 0.25),
        })
    }

    #[test]
    fn test_example_configuration() {
        let config = ConfigItem::new("statistics")
            .with_child(ConfigItem::leaf("total_time", true))
            .with_child(ConfigItem::leaf("size_download", "true"))
            .with_child(ConfigItem::leaf("num_connects", false));
        let set = EnabledFieldSet::from_config(&config).unwrap();

        let stats = TransferSnapshot::new()
            .with_double(InfoKey::TotalTime, 1.23)
            .with_double(InfoKey::SizeDownload, 2048.0)
            .with_long(InfoKey::NumConnects, 3);

        let mut sink = MemorySink::new("mem");
        let n = dispatch(Some(&set), Some(&stats), &DispatchMeta::default(), &mut sink).unwrap();

        assert_eq!(n, 2);
        let samples = sink.samples();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].metric_type, MetricType::Duration);
        assert_eq!(samples[0].type_instance, "total_time");
        assert_eq!(samples[0].value, 1.23);
        assert_eq!(samples[1].metric_type, MetricType::Bytes);
        assert_eq!(samples[1].type_instance, "size_download");
        assert_eq!(samples[1].value, 2048.0);
    }

    #[test]
    fn test_disabled_selector_yields_nothing() {
        let mut sink = MemorySink::new("mem");
        let n = dispatch(None, None, &DispatchMeta::default(), &mut sink).unwrap();
        assert_eq!(n, 0);

        let stats = full_snapshot();
        let n = dispatch(None, Some(&stats), &DispatchMeta::default(), &mut sink).unwrap();
        assert_eq!(n, 0);
        assert!(sink.samples().is_empty());
    }

    #[test]
    fn test_empty_selector_yields_nothing() {
        let set = EnabledFieldSet::none();
        let mut sink = MemorySink::new("mem");
        let n = dispatch(Some(&set), Some(&full_snapshot()), &DispatchMeta::default(), &mut sink)
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_missing_source_is_invalid_argument() {
        let set = selector(&[("total_time", true)]);
        let mut sink = MemorySink::new("mem");
        let err = dispatch(Some(&set), None, &DispatchMeta::default(), &mut sink).unwrap_err();
        assert!(matches!(err, ContractError::InvalidArgument { .. }));
        assert!(sink.samples().is_empty());
    }

    #[test]
    fn test_rate_doubled_to_bits() {
        let set = selector(&[("speed_download", true), ("speed_upload", true)]);
        let stats = TransferSnapshot::new()
            .with_double(InfoKey::SpeedDownload, 1250.5)
            .with_double(InfoKey::SpeedUpload, 0.0);
        let mut sink = MemorySink::new("mem");
        dispatch(Some(&set), Some(&stats), &DispatchMeta::default(), &mut sink).unwrap();

        let samples = sink.samples();
        assert_eq!(samples[0].metric_type, MetricType::Bitrate);
        assert_eq!(samples[0].value, 10004.0);
        assert_eq!(samples[1].value, 0.0);
    }

    #[test]
    fn test_integer_widened() {
        let set = selector(&[("header_size", true), ("redirect_count", true)]);
        let big = (1_i64 << 53) - 1;
        let stats = TransferSnapshot::new()
            .with_long(InfoKey::HeaderSize, big)
            .with_long(InfoKey::RedirectCount, 2);
        let mut sink = MemorySink::new("mem");
        dispatch(Some(&set), Some(&stats), &DispatchMeta::default(), &mut sink).unwrap();

        let samples = sink.samples();
        assert_eq!(samples[0].value, big as f64);
        assert_eq!(samples[0].value as i64, big);
        assert_eq!(samples[1].metric_type, MetricType::Count);
        assert_eq!(samples[1].value, 2.0);
    }

    #[test]
    fn test_integer_field_requires_integer_source() {
        let set = selector(&[("num_connects", true)]);
        let stats = TransferSnapshot::new().with_double(InfoKey::NumConnects, 1.0);
        let mut sink = MemorySink::new("mem");
        let err = dispatch(Some(&set), Some(&stats), &DispatchMeta::default(), &mut sink)
            .unwrap_err();
        match err {
            ContractError::Extraction { field, source } => {
                assert_eq!(field, "num_connects");
                assert!(matches!(source, StatsError::TypeMismatch { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_all_fields_in_registry_order() {
        let entries: Vec<_> = FIELDS.iter().rev().map(|f| (f.name, true)).collect();
        let set = selector(&entries);
        let mut sink = MemorySink::new("mem");
        let n = dispatch(Some(&set), Some(&full_snapshot()), &DispatchMeta::default(), &mut sink)
            .unwrap();

        assert_eq!(n, FIELDS.len());
        let names: Vec<_> = sink.samples().iter().map(|s| s.type_instance.clone()).collect();
        let expected: Vec<_> = FIELDS.iter().map(|f| f.name.to_string()).collect();
        assert_eq!(names, expected);
        for (sample, field) in sink.samples().iter().zip(FIELDS.iter()) {
            assert_eq!(sample.metric_type, field.metric_type);
        }
    }

    #[test]
    fn test_extraction_failure_short_circuits() {
        let set = selector(&[
            ("total_time", true),
            ("connect_time", true),
            ("size_upload", true),
            ("size_download", true),
        ]);
        // third enabled field (size_upload) is missing
        let stats = TransferSnapshot::new()
            .with_double(InfoKey::TotalTime, 1.0)
            .with_double(InfoKey::ConnectTime, 0.1)
            .with_double(InfoKey::SizeDownload, 10.0);
        let mut sink = MemorySink::new("mem");

        let err = dispatch(Some(&set), Some(&stats), &DispatchMeta::default(), &mut sink)
            .unwrap_err();
        match err {
            ContractError::Extraction { field, .. } => assert_eq!(field, "size_upload"),
            other => panic!("unexpected error: {other}"),
        }

        let names: Vec<_> = sink.samples().iter().map(|s| s.type_instance.as_str()).collect();
        assert_eq!(names, vec!["total_time", "connect_time"]);
    }

    #[test]
    fn test_emission_failure_short_circuits() {
        let set = selector(&[("total_time", true), ("connect_time", true), ("num_connects", true)]);
        let mut sink = MemorySink::new("flaky").fail_after(1);

        let err = dispatch(Some(&set), Some(&full_snapshot()), &DispatchMeta::default(), &mut sink)
            .unwrap_err();
        match err {
            ContractError::Emission { field, sink_name, .. } => {
                assert_eq!(field, "connect_time");
                assert_eq!(sink_name, "flaky");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sink.samples().len(), 1);
    }

    #[test]
    fn test_metadata_and_prefix() {
        let set = selector(&[("total_time", true)]);
        let meta = DispatchMeta {
            host: Some("web01".to_string()),
            plugin: Some("curl".to_string()),
            plugin_instance: Some("home".to_string()),
            instance_prefix: Some("home_".to_string()),
        };
        let mut sink = MemorySink::new("mem");
        dispatch(Some(&set), Some(&full_snapshot()), &meta, &mut sink).unwrap();

        let sample = &sink.samples()[0];
        assert_eq!(sample.host.as_deref(), Some("web01"));
        assert_eq!(sample.plugin.as_deref(), Some("curl"));
        assert_eq!(sample.plugin_instance.as_deref(), Some("home"));
        assert_eq!(sample.type_instance, "home_total_time");
    }

    #[test]
    fn test_unset_metadata_stays_unset() {
        let set = selector(&[("total_time", true)]);
        let mut sink = MemorySink::new("mem");
        dispatch(Some(&set), Some(&full_snapshot()), &DispatchMeta::default(), &mut sink).unwrap();

        let sample = &sink.samples()[0];
        assert!(sample.host.is_none());
        assert!(sample.plugin.is_none());
        assert!(sample.plugin_instance.is_none());
    }

    #[test]
    fn test_repeat_dispatch_is_deterministic() {
        let set = selector(&[("speed_upload", true), ("total_time", true)]);
        let stats = full_snapshot();
        let mut first = MemorySink::new("a");
        let mut second = MemorySink::new("b");
        dispatch(Some(&set), Some(&stats), &DispatchMeta::default(), &mut first).unwrap();
        dispatch(Some(&set), Some(&stats), &DispatchMeta::default(), &mut second).unwrap();
        assert_eq!(first.samples(), second.samples());
    }

    #[test]
    fn test_page_stats_from_page() {
        let page = PageConfig {
            name: "home".to_string(),
            url: Some("http://localhost/".to_string()),
            plugin_instance: None,
            instance_prefix: Some("p_".to_string()),
            statistics: Some(ConfigBlock(vec![ConfigItem::leaf("num_connects", "yes")])),
        };
        let stats = PageStats::from_page(&page, Some("web01"), "curl").unwrap();
        assert_eq!(stats.name(), "home");
        assert_eq!(stats.meta().plugin_instance.as_deref(), Some("home"));

        let mut sink = MemorySink::new("mem");
        let n = stats.dispatch(&full_snapshot(), &mut sink).unwrap();
        assert_eq!(n, 1);
        assert_eq!(sink.samples()[0].type_instance, "p_num_connects");
        assert_eq!(sink.samples()[0].value, 7.0);
    }

    #[test]
    fn test_page_stats_without_statistics() {
        let page = PageConfig {
            name: "bare".to_string(),
            url: None,
            plugin_instance: None,
            instance_prefix: None,
            statistics: None,
        };
        let stats = PageStats::from_page(&page, None, "curl").unwrap();
        assert!(stats.selector().is_none());

        let mut sink = MemorySink::new("mem");
        assert_eq!(stats.dispatch(&full_snapshot(), &mut sink).unwrap(), 0);
    }

    #[test]
    fn test_page_stats_rejects_unknown_field() {
        let page = PageConfig {
            name: "bad".to_string(),
            url: None,
            plugin_instance: None,
            instance_prefix: None,
            statistics: Some(ConfigBlock(vec![ConfigItem::leaf("latency", true)])),
        };
        let err = PageStats::from_page(&page, None, "curl").unwrap_err();
        assert!(matches!(err, ContractError::UnknownField { .. }));
    }
}
