use diwire_core::{parse_event_lines, EngineConfig, ModuleEngine};
use std::io::Cursor;
use std::path::PathBuf;

const EVENTS: &str = r#"
# scanner output for the carstore client
{"kind":"binding","owner":"com.acme.carstore.client.gin.RestModule","implementer":"com.acme.carstore.client.rest.RatingServiceImpl","implemented":"com.acme.carstore.client.rest.RatingService","scope":"javax.inject.Singleton"}
{"kind":"submodule","owner":"com.acme.carstore.client.gin.ClientModule","child":"com.acme.carstore.client.gin.RestModule"}
{"kind":"ignored"}
{"kind":"binding","owner":"com.acme.carstore.client.gin.ClientModule","implementer":"com.acme.carstore.client.Bootstrapper","eager_singleton":true}
{"kind":"binding","owner":"com.acme.carstore.client.gin.RestModule","implementer":"com.acme.carstore.client.rest.RatingServiceImpl","implemented":"com.acme.carstore.client.rest.RatingService","scope":"javax.inject.Singleton"}
"#;

fn config_for(output_dir: PathBuf) -> EngineConfig {
    EngineConfig {
        output_dir,
        ..EngineConfig::default()
    }
}

#[test]
fn writes_modules_and_manifest_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path().to_path_buf());
    let batch = parse_event_lines(Cursor::new(EVENTS)).unwrap();
    assert_eq!(batch.malformed_lines, 0);

    let mut engine = ModuleEngine::from_config(&config).unwrap();
    for event in batch.events {
        engine.process(event);
    }
    let report = engine.finalize();

    assert!(report.is_complete());
    assert_eq!(report.ignored_events, 1);
    assert_eq!(report.written_count(), 2);

    let manifest = std::fs::read_to_string(dir.path().join("META-INF/gwtp/ginModules")).unwrap();
    assert_eq!(
        manifest,
        "com.acme.carstore.client.gin.RestModule\ncom.acme.carstore.client.gin.ClientModule\n"
    );

    let rest_module = std::fs::read_to_string(
        dir.path()
            .join("com/acme/carstore/client/gin/RestModule.java"),
    )
    .unwrap();
    assert!(rest_module.starts_with("package com.acme.carstore.client.gin;\n"));
    assert!(rest_module.contains("public class RestModule extends AbstractGinModule {"));
    assert_eq!(
        rest_module
            .matches("bind(com.acme.carstore.client.rest.RatingService.class)")
            .count(),
        1
    );
    assert!(rest_module.contains(
        ".to(com.acme.carstore.client.rest.RatingServiceImpl.class).in(javax.inject.Singleton.class);"
    ));

    let client_module = std::fs::read_to_string(
        dir.path()
            .join("com/acme/carstore/client/gin/ClientModule.java"),
    )
    .unwrap();
    assert!(client_module.contains("install(new com.acme.carstore.client.gin.RestModule());"));
    assert!(client_module
        .contains("bind(com.acme.carstore.client.Bootstrapper.class).asEagerSingleton();"));
}

#[test]
fn custom_template_and_extension_are_honored() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("module.tera");
    std::fs::write(
        &template,
        "object {{ name }} {% for b in bindings %}[{{ b.implementer }}]{% endfor %}",
    )
    .unwrap();

    let mut config = config_for(dir.path().join("out"));
    config.source_extension = "kt".to_string();
    config.manifest_name = "acme/modules".to_string();
    config.template = Some(template);

    let mut engine = ModuleEngine::from_config(&config).unwrap();
    let batch = parse_event_lines(Cursor::new(
        r#"{"kind":"binding","owner":"com.acme.AppModule","implementer":"com.acme.Clock"}"#,
    ))
    .unwrap();
    for event in batch.events {
        engine.process(event);
    }
    let report = engine.finalize();
    assert!(report.is_complete());

    let module = std::fs::read_to_string(dir.path().join("out/com/acme/AppModule.kt")).unwrap();
    assert_eq!(module, "object AppModule [com.acme.Clock]");
    let manifest =
        std::fs::read_to_string(dir.path().join("out/META-INF/acme/modules")).unwrap();
    assert_eq!(manifest, "com.acme.AppModule\n");
}

#[test]
fn missing_template_fails_engine_construction() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path().to_path_buf());
    config.template = Some(dir.path().join("absent.tera"));
    assert!(ModuleEngine::from_config(&config).is_err());
}
