//! Centralized integration tests for di-impl crate
use di_abstractions::{Constructor, Injectable, Provider, ProviderDecl, ServiceRegistry};
use di_common::{ProviderError, Token};
use di_impl::{build_registry, RegistryStats, ServiceContainerRegistry};
use std::convert::Infallible;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 测试服务
#[derive(Debug)]
struct TestService {
    name: String,
}

static TEST_SERVICE_CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

impl Injectable for TestService {
    type Error = Infallible;

    fn construct() -> Result<Self, Self::Error> {
        TEST_SERVICE_CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
        Ok(Self {
            name: "constructed".to_string(),
        })
    }
}

#[derive(Debug, Default)]
struct ShorthandService;

#[derive(Debug, thiserror::Error)]
#[error("数据库连接不可用")]
struct DatabaseDown;

#[test]
fn test_use_value_returns_identical_instance() -> anyhow::Result<()> {
    let config = Token::named("it.value.config");
    let shared: Arc<Vec<u32>> = Arc::new(vec![1, 2, 3]);

    let mut registry = ServiceContainerRegistry::new(None);
    registry.add(Provider::shared(config.clone(), shared.clone()))?;

    let first = registry.get_as::<Vec<u32>>(&config)?;
    let second = registry.get_as::<Vec<u32>>(&config)?;
    assert!(Arc::ptr_eq(&first, &shared));
    assert!(Arc::ptr_eq(&first, &second));
    Ok(())
}

#[test]
fn test_use_class_constructs_once() -> anyhow::Result<()> {
    let token = Token::of::<TestService>();
    let mut registry = ServiceContainerRegistry::new(None);
    registry.add(Provider::class(token.clone(), Constructor::of::<TestService>()))?;

    assert_eq!(TEST_SERVICE_CONSTRUCTIONS.load(Ordering::SeqCst), 0);
    let first = registry.get_as::<TestService>(&token)?;
    let second = registry.resolve::<TestService>()?;

    assert_eq!(first.name, "constructed");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(TEST_SERVICE_CONSTRUCTIONS.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_use_factory_invoked_at_most_once() -> anyhow::Result<()> {
    let token = Token::unique("it.factory");
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut registry = ServiceContainerRegistry::new(None);
    registry.add(Provider::factory(token.clone(), move || {
        counter.fetch_add(1, Ordering::SeqCst);
        String::from("factory_created")
    }))?;

    assert_eq!(calls.load(Ordering::SeqCst), 0, "工厂应延迟到首次解析时调用");
    let first = registry.get(&token)?;
    let second = registry.get(&token)?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_child_delegates_to_parent() -> anyhow::Result<()> {
    let token = Token::unique("it.parent-only");
    let parent = build_registry(&[Provider::value(token.clone(), 42_u32).into()], None)?.into_handle();
    let child = build_registry(&[], Some(parent.clone()))?;

    assert!(Arc::ptr_eq(&child.get(&token)?, &parent.get(&token)?));
    assert!(!child.contains(&token));
    assert!(child.can_resolve(&token));
    Ok(())
}

#[test]
fn test_child_override_is_local() -> anyhow::Result<()> {
    let token = Token::unique("it.override");
    let parent = build_registry(&[Provider::value(token.clone(), "v1").into()], None)?.into_handle();
    let child = build_registry(&[Provider::value(token.clone(), "v2").into()], Some(parent.clone()))?;

    assert_eq!(*child.get_as::<&'static str>(&token)?, "v2");
    assert_eq!(*parent.get_as::<&'static str>(&token)?, "v1");
    Ok(())
}

#[test]
fn test_alias_shares_target_instance() -> anyhow::Result<()> {
    let target = Token::unique("it.alias-target");
    let alias = Token::unique("it.alias");

    let registry = build_registry(
        &[
            Provider::factory(target.clone(), || vec![String::from("memoized")]).into(),
            Provider::existing(alias.clone(), target.clone()).into(),
        ],
        None,
    )?;

    assert!(Arc::ptr_eq(&registry.get(&alias)?, &registry.get(&target)?));
    Ok(())
}

#[test]
fn test_child_alias_reaches_parent_target() -> anyhow::Result<()> {
    let target = Token::unique("it.parent-target");
    let alias = Token::unique("it.child-alias");

    let parent = build_registry(&[Provider::value(target.clone(), 7_i64).into()], None)?.into_handle();
    let child = build_registry(
        &[Provider::existing(alias.clone(), target.clone()).into()],
        Some(parent.clone()),
    )?;

    assert!(Arc::ptr_eq(&child.get(&alias)?, &parent.get(&target)?));
    Ok(())
}

#[test]
fn test_unregistered_token_is_not_found() {
    let token = Token::unique("it.missing");
    let registry = ServiceContainerRegistry::new(None);

    let err = registry.get(&token).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("Symbol(it.missing)"));
}

#[test]
fn test_declaration_without_provide_is_malformed() {
    let mut registry = ServiceContainerRegistry::new(None);
    let err = registry
        .add(ProviderDecl::new().use_value(1_u8).with_key("foo"))
        .unwrap_err();

    match &err {
        ProviderError::MalformedProvider { keys } => assert_eq!(keys, &["useValue", "foo"]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("\"useValue\", \"foo\""));
    assert!(registry.is_empty());
}

#[test]
fn test_declaration_without_use_key_lists_valid_options() {
    let token = Token::unique("it.no-use-key");
    let mut registry = ServiceContainerRegistry::new(None);
    let err = registry
        .add(ProviderDecl::new().provide(token).with_key("useCls"))
        .unwrap_err();

    assert!(matches!(err, ProviderError::MissingUseKey { .. }));
    assert!(err.is_malformed());
    assert!(err
        .to_string()
        .contains(r#"["useValue", "useClass", "useFactory", "useExisting"]"#));
}

#[test]
fn test_declaration_with_two_use_keys_is_rejected() {
    let token = Token::unique("it.two-use-keys");
    let mut registry = ServiceContainerRegistry::new(None);
    let err = registry
        .add(
            ProviderDecl::new()
                .provide(token.clone())
                .use_value(1_u8)
                .use_existing(Token::unique("it.elsewhere")),
        )
        .unwrap_err();

    assert!(err.is_malformed());
    match err {
        ProviderError::ConflictingUseKeys { keys, .. } => {
            assert_eq!(keys, vec!["useValue", "useExisting"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!registry.contains(&token));
}

#[test]
fn test_shorthand_matches_explicit_use_class() -> anyhow::Result<()> {
    let shorthand = build_registry(&[Constructor::from_default::<ShorthandService>().into()], None)?;
    let explicit = build_registry(
        &[Provider::class(
            Token::of::<ShorthandService>(),
            Constructor::from_default::<ShorthandService>(),
        )
        .into()],
        None,
    )?;

    assert_eq!(shorthand.tokens(), explicit.tokens());
    assert!(Arc::ptr_eq(
        &shorthand.resolve::<ShorthandService>()?,
        &shorthand.resolve::<ShorthandService>()?
    ));
    assert!(explicit.resolve::<ShorthandService>().is_ok());
    Ok(())
}

#[test]
fn test_value_visible_from_empty_child_scope() -> anyhow::Result<()> {
    let a = Token::named("it.scenario.a");
    let r1 = build_registry(&[Provider::value(a.clone(), "a").into()], None)?.into_handle();
    let r2 = build_registry(&[], Some(r1))?;

    assert_eq!(*r2.get_as::<&'static str>(&a)?, "a");
    Ok(())
}

#[test]
fn test_dangling_alias_names_alias_and_target() {
    let alias = Token::unique("it.dangling-alias");
    let target = Token::unique("it.absent-target");
    let parent = build_registry(&[], None).unwrap().into_handle();
    let child =
        build_registry(&[Provider::existing(alias.clone(), target.clone()).into()], Some(parent)).unwrap();

    let err = child.get(&alias).unwrap_err();
    match &err {
        ProviderError::AliasResolution {
            alias: reported_alias,
            target: reported_target,
        } => {
            assert_eq!(reported_alias, &alias);
            assert_eq!(reported_target, &target);
        }
        other => panic!("unexpected error: {other}"),
    }
    let message = err.to_string();
    assert!(message.contains("Symbol(it.dangling-alias)"));
    assert!(message.contains("Symbol(it.absent-target)"));
}

#[test]
fn test_factory_failure_keeps_source_and_retries() {
    let token = Token::unique("it.flaky");
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let registry = build_registry(
        &[Provider::try_factory(token.clone(), move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(DatabaseDown)
            } else {
                Ok(String::from("connected"))
            }
        })
        .into()],
        None,
    )
    .unwrap();

    let err = registry.get(&token).unwrap_err();
    assert!(matches!(err, ProviderError::ProviderConstruction { .. }));
    assert!(err.to_string().contains("数据库连接不可用"));
    assert!(err.source().unwrap().downcast_ref::<DatabaseDown>().is_some());

    // 失败不会被缓存，下一次解析重新调用工厂
    assert_eq!(*registry.get_as::<String>(&token).unwrap(), "connected");
    assert_eq!(*registry.get_as::<String>(&token).unwrap(), "connected");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_wrong_type_is_a_type_mismatch() {
    let token = Token::unique("it.mismatch");
    let registry = build_registry(&[Provider::value(token.clone(), 1_u8).into()], None).unwrap();

    assert!(matches!(
        registry.get_as::<String>(&token),
        Err(ProviderError::TypeMismatch { .. })
    ));
}

#[test]
fn test_later_registration_overrides_earlier() -> anyhow::Result<()> {
    let token = Token::unique("it.last-wins");
    let mut registry = ServiceContainerRegistry::new(None);
    registry.add_all(&[
        Provider::value(token.clone(), 1_u8).into(),
        Provider::value(token.clone(), 2_u8).into(),
    ])?;

    assert_eq!(registry.len(), 1);
    assert_eq!(*registry.get_as::<u8>(&token)?, 2);
    Ok(())
}

#[test]
fn test_stats_track_lazy_instantiation() -> anyhow::Result<()> {
    let value = Token::unique("it.stats.value");
    let lazy = Token::unique("it.stats.lazy");
    let alias = Token::unique("it.stats.alias");

    let registry = build_registry(
        &[
            Provider::value(value.clone(), 1_u8).into(),
            Provider::factory(lazy.clone(), || 2_u8).into(),
            Provider::existing(alias.clone(), lazy.clone()).into(),
        ],
        None,
    )?;

    assert_eq!(
        registry.stats(),
        RegistryStats {
            registered_providers: 3,
            instantiated: 1,
            aliases: 1,
        }
    );

    registry.get(&alias)?;
    assert_eq!(registry.stats().instantiated, 2);
    Ok(())
}

#[test]
fn test_handle_exposes_only_resolution() -> anyhow::Result<()> {
    let token = Token::unique("it.handle");
    let handle = build_registry(&[Provider::value(token.clone(), "read-only").into()], None)?.into_handle();
    let copy = handle.clone();

    assert!(handle.ptr_eq(&copy));
    assert!(copy.can_resolve(&token));
    assert_eq!(*copy.get_as::<&'static str>(&token)?, "read-only");
    Ok(())
}

#[test]
fn test_named_child_scope() -> anyhow::Result<()> {
    let token = Token::unique("it.child-of");
    let root = build_registry(&[Provider::value(token.clone(), 'r').into()], None)?.into_handle();

    let mut child = ServiceContainerRegistry::child_of(root.clone(), "feature");
    child.add(Provider::value(token.clone(), 'c'))?;

    assert_eq!(child.scope().name, "root.feature");
    assert!(child.parent().is_some_and(|parent| parent.ptr_eq(&root)));
    assert_eq!(*child.get_as::<char>(&token)?, 'c');
    assert_eq!(*root.get_as::<char>(&token)?, 'r');
    Ok(())
}
