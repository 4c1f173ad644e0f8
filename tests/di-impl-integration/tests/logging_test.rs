//! 提供者失败诊断日志测试
use di_abstractions::Provider;
use di_common::{ProviderError, RegistryConfig, Token};
use di_impl::{build_registry, ServiceContainerRegistry};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

/// 收集日志输出的缓冲区
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 在捕获日志的订阅者下运行 `f`
fn with_captured_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.contents())
}

#[derive(Debug, thiserror::Error)]
#[error("上游服务超时")]
struct UpstreamTimeout;

#[test]
fn test_provider_failure_is_logged_before_returning() {
    let token = Token::unique("log.failing");
    let registry = build_registry(
        &[Provider::try_factory(token.clone(), || Err::<String, _>(UpstreamTimeout)).into()],
        None,
    )
    .unwrap();

    let (result, logs) = with_captured_logs(|| registry.get(&token));

    assert!(matches!(result, Err(ProviderError::ProviderConstruction { .. })));
    let line = logs
        .lines()
        .find(|line| line.contains("ERROR"))
        .unwrap_or_else(|| panic!("没有错误日志: {logs}"));
    assert!(line.contains("[service-container]"));
    assert!(line.contains("Symbol(log.failing)"));
}

#[test]
fn test_provider_failure_log_can_be_disabled() {
    let token = Token::unique("log.quiet");
    let config = RegistryConfig {
        log_provider_failures: false,
        ..RegistryConfig::default()
    };
    let mut registry = ServiceContainerRegistry::with_config(None, config);
    registry
        .add(Provider::try_factory(token.clone(), || Err::<String, _>(UpstreamTimeout)))
        .unwrap();

    let (result, logs) = with_captured_logs(|| registry.get(&token));

    assert!(result.is_err());
    assert!(!logs.contains("ERROR"));
}

#[test]
fn test_override_warning_names_token() {
    let token = Token::unique("log.override");

    let (_, logs) = with_captured_logs(|| {
        let mut registry = ServiceContainerRegistry::new(None);
        registry.add(Provider::value(token.clone(), 1_u8)).unwrap();
        registry.add(Provider::value(token.clone(), 2_u8)).unwrap();
    });

    let line = logs
        .lines()
        .find(|line| line.contains("WARN"))
        .unwrap_or_else(|| panic!("没有覆盖警告: {logs}"));
    assert!(line.contains("Symbol(log.override)"));
}
