//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试 (字段注册表)
//! - 配置 -> 选择器 -> 分发 -> sink 的端到端测试

#[cfg(test)]
mod contract_tests {
    use contracts::{ExtractionKind, MetricType, FIELDS, FIELD_COUNT};

    #[test]
    fn test_registry_snapshot() {
        let names: Vec<_> = FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec![
                "total_time",
                "namelookup_time",
                "connect_time",
                "pretransfer_time",
                "size_upload",
                "size_download",
                "speed_download",
                "speed_upload",
                "header_size",
                "request_size",
                "content_length_download",
                "content_length_upload",
                "starttransfer_time",
                "redirect_time",
                "redirect_count",
                "num_connects",
                "appconnect_time",
            ]
        );
        assert_eq!(FIELDS.len(), FIELD_COUNT);
    }

    #[test]
    fn test_registry_kinds() {
        for field in FIELDS.iter() {
            match field.metric_type {
                MetricType::Duration | MetricType::Bytes => {
                    assert_ne!(field.kind, ExtractionKind::Rate, "{}", field.name)
                }
                MetricType::Bitrate => assert_eq!(field.kind, ExtractionKind::Rate),
                MetricType::Count => {}
            }
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{InfoKey, MetricSample, MetricType, TransferSnapshot};
    use dispatcher::{
        create_worker, BoxedSink, CompletedTransfer, FanoutSink, FileSink, FileSinkConfig,
        MemorySink, MetricSink, PageStats,
    };
    use tokio::sync::mpsc;

    const CONFIG: &str = r#"
hostname = "web01"

[[pages]]
name = "home"
url = "http://localhost/"
[pages.statistics]
total_time = true
size_download = "true"
num_connects = false

[[pages]]
name = "api"
plugin_instance = "api_v2"
instance_prefix = "api-"
[pages.statistics]
speed_download = true
redirect_count = "yes"

[[pages]]
name = "health"
"#;

    fn page(name: &str) -> PageStats {
        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let page = blueprint.pages.iter().find(|p| p.name == name).unwrap();
        PageStats::from_page(page, blueprint.hostname.as_deref(), &blueprint.plugin).unwrap()
    }

    fn values(samples: &[MetricSample]) -> Vec<(MetricType, &str, f64)> {
        samples
            .iter()
            .map(|s| (s.metric_type, s.type_instance.as_str(), s.value))
            .collect()
    }

    /// Configuration -> selector -> dispatch -> sink
    #[test]
    fn test_e2e_selected_fields_only() {
        let snapshot = TransferSnapshot::new()
            .with_double(InfoKey::TotalTime, 1.23)
            .with_double(InfoKey::SizeDownload, 2048.0)
            .with_long(InfoKey::NumConnects, 3);
        let mut sink = MemorySink::new("mem");

        let emitted = page("home").dispatch(&snapshot, &mut sink).unwrap();

        assert_eq!(emitted, 2);
        assert_eq!(
            values(sink.samples()),
            vec![
                (MetricType::Duration, "total_time", 1.23),
                (MetricType::Bytes, "size_download", 2048.0),
            ]
        );

        let first = &sink.samples()[0];
        assert_eq!(first.host.as_deref(), Some("web01"));
        assert_eq!(first.plugin.as_deref(), Some("curl"));
        assert_eq!(first.plugin_instance.as_deref(), Some("home"));
    }

    #[test]
    fn test_e2e_prefix_and_conversions() {
        let snapshot = TransferSnapshot::new()
            .with_double(InfoKey::SpeedDownload, 1000.0)
            .with_long(InfoKey::RedirectCount, 2);
        let mut sink = MemorySink::new("mem");

        page("api").dispatch(&snapshot, &mut sink).unwrap();

        assert_eq!(
            values(sink.samples()),
            vec![
                (MetricType::Bitrate, "api-speed_download", 8000.0),
                (MetricType::Count, "api-redirect_count", 2.0),
            ]
        );
        assert_eq!(sink.samples()[0].plugin_instance.as_deref(), Some("api_v2"));
    }

    #[test]
    fn test_e2e_page_without_statistics() {
        let mut sink = MemorySink::new("mem");
        let emitted = page("health")
            .dispatch(&TransferSnapshot::new(), &mut sink)
            .unwrap();
        assert_eq!(emitted, 0);
        assert!(sink.samples().is_empty());
    }

    #[test]
    fn test_e2e_fanout_delivers_to_every_sink() {
        let dir = tempfile::tempdir().unwrap();
        let paths = [dir.path().join("a.jsonl"), dir.path().join("b.jsonl")];

        let snapshot = TransferSnapshot::new()
            .with_double(InfoKey::TotalTime, 0.2)
            .with_double(InfoKey::SizeDownload, 10.0);
        let sinks: Vec<BoxedSink> = paths
            .iter()
            .map(|path| {
                let config = FileSinkConfig {
                    path: path.clone(),
                    truncate: true,
                };
                Box::new(FileSink::new("file", config).unwrap()) as BoxedSink
            })
            .collect();
        let mut fanout = FanoutSink::new("fanout", sinks);

        let emitted = page("home").dispatch(&snapshot, &mut fanout).unwrap();
        assert_eq!(emitted, 2);
        fanout.flush().unwrap();

        for path in &paths {
            let records: Vec<serde_json::Value> = std::fs::read_to_string(path)
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect();
            assert_eq!(records.len(), 2, "{}", path.display());
            assert_eq!(records[0]["type_instance"], "total_time");
            assert_eq!(records[0]["value"], 0.2);
            assert_eq!(records[1]["type_instance"], "size_download");
            assert_eq!(records[1]["value"], 10.0);
        }
    }

    /// JSON lines -> worker -> JSONL file sink
    #[tokio::test]
    async fn test_e2e_worker_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("samples.jsonl");

        let mut blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        blueprint.sinks = vec![contracts::SinkConfig {
            name: "jsonl".into(),
            sink_type: contracts::SinkType::File,
            params: [("path".to_string(), out.display().to_string())]
                .into_iter()
                .collect(),
        }];

        let (tx, rx) = mpsc::channel::<CompletedTransfer>(8);
        let handle = create_worker(&blueprint, rx).unwrap().spawn();

        let lines = [
            r#"{"page": "home", "stats": {"total_time": 1.23, "size_download": 2048.0, "num_connects": 3}}"#,
            r#"{"page": "api", "stats": {"speed_download": 10.0}}"#,
            r#"{"page": "health", "stats": {}}"#,
        ];
        for line in lines {
            tx.send(serde_json::from_str(line).unwrap()).await.unwrap();
        }
        drop(tx);

        let report = handle.await.unwrap();
        assert_eq!(report.counters.transfers, 3);
        // api aborts on the missing redirect_count after emitting speed_download
        assert_eq!(report.counters.failures, 1);
        assert_eq!(report.counters.samples, 3);
        assert_eq!(report.summary.total_samples, 3);

        let written = std::fs::read_to_string(&out).unwrap();
        let records: Vec<serde_json::Value> = written
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["type"], "duration");
        assert_eq!(records[0]["type_instance"], "total_time");
        assert_eq!(records[2]["type_instance"], "api-speed_download");
        assert_eq!(records[2]["value"], 80.0);
        assert!(records[0]["time"].is_string());
    }

    /// Bundled demo configuration replayed with the bundled transfers
    #[tokio::test]
    async fn test_e2e_demo_replay() {
        let mut blueprint = ConfigLoader::load_from_str(
            include_str!("../../../demos/curl_stats.toml"),
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(blueprint.sinks.len(), 3);
        blueprint.sinks = vec![contracts::SinkConfig {
            name: "mem".into(),
            sink_type: contracts::SinkType::Memory,
            params: Default::default(),
        }];

        let (tx, rx) = mpsc::channel::<CompletedTransfer>(8);
        let handle = create_worker(&blueprint, rx).unwrap().spawn();
        for line in include_str!("../../../demos/transfers.jsonl").lines() {
            tx.send(serde_json::from_str(line).unwrap()).await.unwrap();
        }
        drop(tx);

        let report = handle.await.unwrap();
        assert_eq!(report.counters.transfers, 6);
        assert_eq!(report.counters.unknown_pages, 1);
        assert_eq!(report.counters.failures, 1);
        // the second api transfer delivers total_time and header_size before aborting
        assert_eq!(report.counters.samples, 13);
        assert_eq!(report.summary.total_samples, 13);

        let (metric_type, speed) = &report.summary.series["home/speed_download"];
        assert_eq!(*metric_type, MetricType::Bitrate);
        assert_eq!(speed.count, 2);
        assert!((speed.min - 13320.0).abs() < 1e-9);
        assert!(report.summary.series.contains_key("api_health/api-header_size"));
    }
}
