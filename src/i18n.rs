use crate::error::{Result, WidgetLabError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

pub const DEFAULT_NAMESPACE: &str = "index";
pub const FALLBACK_LANGUAGE: &str = "en";
const CACHE_PREFIX: &str = "i18n_cache__";
const BUILD_FILE: &str = "i18n_build";

/// Flat `key -> text` map for one language and namespace
pub type Bundle = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}

impl Language {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

pub fn available_languages() -> Vec<Language> {
    vec![Language::new("en", "English"), Language::new("es", "Español")]
}

/// Supplies raw, nested translation documents
#[cfg_attr(test, mockall::automock)]
pub trait TranslationSource: Send + Sync {
    /// `Ok(None)` when the language has no such namespace
    fn load(&self, language: &str, namespace: &str) -> Result<Option<Value>>;
}

fn check_segment(segment: &str) -> Result<()> {
    if segment.is_empty() || segment.contains(['/', '\\']) || segment.contains("..") {
        return Err(WidgetLabError::Translation(format!(
            "invalid language or namespace '{}'",
            segment
        )));
    }
    Ok(())
}

/// `<root>/<language>/<namespace>.json`
#[derive(Debug, Clone)]
pub struct DirTranslationSource {
    root: PathBuf,
}

impl DirTranslationSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl TranslationSource for DirTranslationSource {
    fn load(&self, language: &str, namespace: &str) -> Result<Option<Value>> {
        check_segment(language)?;
        check_segment(namespace)?;
        let path = self.root.join(language).join(format!("{}.json", namespace));
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

/// Catalogs held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTranslationSource {
    catalogs: HashMap<(String, String), Value>,
}

impl MemoryTranslationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, language: &str, namespace: &str, value: Value) {
        self.catalogs
            .insert((language.to_string(), namespace.to_string()), value);
    }

    pub fn with(mut self, language: &str, namespace: &str, value: Value) -> Self {
        self.insert(language, namespace, value);
        self
    }

    /// Catalogs shipped under `languages/`
    pub fn builtin() -> Self {
        let embedded = [
            ("en", "index", include_str!("../languages/en/index.json")),
            ("en", "explorer", include_str!("../languages/en/explorer.json")),
            ("en", "hola", include_str!("../languages/en/hola.json")),
            ("es", "index", include_str!("../languages/es/index.json")),
            ("es", "explorer", include_str!("../languages/es/explorer.json")),
            ("es", "hola", include_str!("../languages/es/hola.json")),
        ];

        let mut source = Self::new();
        for (language, namespace, json) in embedded {
            match serde_json::from_str(json) {
                Ok(value) => source.insert(language, namespace, value),
                Err(e) => log::error!("Builtin catalog {}/{} is invalid: {}", language, namespace, e),
            }
        }
        source
    }
}

impl TranslationSource for MemoryTranslationSource {
    fn load(&self, language: &str, namespace: &str) -> Result<Option<Value>> {
        Ok(self
            .catalogs
            .get(&(language.to_string(), namespace.to_string()))
            .cloned())
    }
}

/// Disk cache in front of another source.
///
/// Entries are stored as `i18n_cache__<language>_<namespace>.json` and are
/// dropped whenever the recorded build stamp differs from the current one.
pub struct CachedTranslationSource<S> {
    inner: S,
    dir: PathBuf,
}

impl<S: TranslationSource> CachedTranslationSource<S> {
    pub fn new<P: Into<PathBuf>>(inner: S, dir: P, build: &str) -> Self {
        let source = Self {
            inner,
            dir: dir.into(),
        };
        if let Err(e) = source.invalidate_if_stale(build) {
            log::warn!("Translation cache {:?} could not be prepared: {}", source.dir, e);
        }
        source
    }

    fn cache_path(&self, language: &str, namespace: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}_{}.json", CACHE_PREFIX, language, namespace))
    }

    fn invalidate_if_stale(&self, build: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let stamp_path = self.dir.join(BUILD_FILE);
        let stored = std::fs::read_to_string(&stamp_path).ok();
        if stored.as_deref() == Some(build) {
            return Ok(());
        }

        log::info!("Translation cache build changed ({:?} -> {}), clearing", stored, build);
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with(CACHE_PREFIX) {
                std::fs::remove_file(entry.path())?;
            }
        }
        std::fs::write(stamp_path, build)?;
        Ok(())
    }
}

impl<S: TranslationSource> TranslationSource for CachedTranslationSource<S> {
    fn load(&self, language: &str, namespace: &str) -> Result<Option<Value>> {
        check_segment(language)?;
        check_segment(namespace)?;
        let path = self.cache_path(language, namespace);
        if let Ok(content) = std::fs::read_to_string(&path) {
            match serde_json::from_str(&content) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => log::warn!("Discarding corrupt cache entry {:?}: {}", path, e),
            }
        }

        let loaded = self.inner.load(language, namespace)?;
        if let Some(value) = &loaded {
            if let Err(e) = std::fs::write(&path, value.to_string()) {
                log::warn!("Could not write translation cache {:?}: {}", path, e);
            }
        }
        Ok(loaded)
    }
}

/// Flatten nested objects into dot-separated keys, keeping string leaves only
pub fn flatten_translations(value: &Value) -> Bundle {
    let mut bundle = Bundle::new();
    flatten_into(value, "", &mut bundle);
    bundle
}

fn flatten_into(value: &Value, prefix: &str, bundle: &mut Bundle) {
    if let Value::Object(map) = value {
        for (key, child) in map {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            match child {
                Value::String(text) => {
                    bundle.insert(full_key, text.clone());
                }
                Value::Object(_) => flatten_into(child, &full_key, bundle),
                _ => {}
            }
        }
    }
}

/// Replace `{{name}}` placeholders
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    params.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{{{}}}}}", name), value)
    })
}

/// Load one namespace, retrying the fallback language once before giving up with an empty bundle
pub fn load_translations(
    source: &dyn TranslationSource,
    language: &str,
    namespace: &str,
    fallback: &str,
) -> Bundle {
    match source.load(language, namespace) {
        Ok(Some(value)) if value.is_object() => return flatten_translations(&value),
        Ok(_) => log::warn!("No translations for {}/{}", language, namespace),
        Err(e) => log::warn!("Failed to load translations {}/{}: {}", language, namespace, e),
    }

    if language != fallback {
        log::info!("Falling back to '{}' for namespace '{}'", fallback, namespace);
        return load_translations(source, fallback, namespace, fallback);
    }
    Bundle::new()
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LanguageSettings {
    language: Option<String>,
}

/// Translation context: languages, registered namespaces, loaded bundles and
/// the active language.
pub struct I18n {
    source: Arc<dyn TranslationSource>,
    languages: Vec<Language>,
    fallback: String,
    current: String,
    namespaces: Vec<String>,
    resources: HashMap<String, HashMap<String, Bundle>>,
    settings_path: Option<PathBuf>,
    notifier: watch::Sender<String>,
}

impl I18n {
    pub fn new(source: Arc<dyn TranslationSource>) -> Self {
        let (notifier, _receiver) = watch::channel(FALLBACK_LANGUAGE.to_string());
        Self {
            source,
            languages: available_languages(),
            fallback: FALLBACK_LANGUAGE.to_string(),
            current: FALLBACK_LANGUAGE.to_string(),
            namespaces: Vec::new(),
            resources: HashMap::new(),
            settings_path: None,
            notifier,
        }
    }

    pub fn with_languages(mut self, languages: Vec<Language>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_fallback(mut self, fallback: &str) -> Self {
        self.fallback = fallback.to_string();
        self.current = fallback.to_string();
        self
    }

    pub fn with_settings_path(mut self, path: Option<PathBuf>) -> Self {
        self.settings_path = path;
        self
    }

    pub fn source(&self) -> Arc<dyn TranslationSource> {
        Arc::clone(&self.source)
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn fallback_language(&self) -> &str {
        &self.fallback
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.languages.iter().any(|language| language.code == code)
    }

    pub fn current_language(&self) -> &str {
        &self.current
    }

    pub fn current_language_name(&self) -> &str {
        self.languages
            .iter()
            .find(|language| language.code == self.current)
            .map(|language| language.name.as_str())
            .unwrap_or(&self.current)
    }

    /// Language after the current one, wrapping around
    pub fn next_language(&self) -> &str {
        let index = self
            .languages
            .iter()
            .position(|language| language.code == self.current)
            .map(|index| (index + 1) % self.languages.len())
            .unwrap_or(0);
        self.languages
            .get(index)
            .map(|language| language.code.as_str())
            .unwrap_or(&self.fallback)
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.notifier.subscribe()
    }

    /// Register a namespace. Bundles are loaded right away once a language is active.
    pub fn register_namespace(&mut self, namespace: &str) -> bool {
        if self.namespaces.iter().any(|ns| ns == namespace) {
            return false;
        }
        self.namespaces.push(namespace.to_string());

        if !self.resources.is_empty() {
            let mut languages = vec![self.current.clone()];
            if self.fallback != self.current {
                languages.push(self.fallback.clone());
            }
            for language in languages {
                let bundle = load_translations(self.source.as_ref(), &language, namespace, &self.fallback);
                self.resources
                    .entry(language)
                    .or_default()
                    .insert(namespace.to_string(), bundle);
            }
        }
        true
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// First registered namespace, or `index`
    pub fn default_namespace(&self) -> &str {
        self.namespaces
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_NAMESPACE)
    }

    pub fn has_bundle(&self, language: &str, namespace: &str) -> bool {
        self.resources
            .get(language)
            .map(|bundles| bundles.contains_key(namespace))
            .unwrap_or(false)
    }

    pub fn saved_language(&self) -> Option<String> {
        let path = self.settings_path.as_ref()?;
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str::<LanguageSettings>(&content)
            .ok()
            .and_then(|settings| settings.language)
    }

    fn clear_saved_language(&self) {
        if let Some(path) = &self.settings_path {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    log::warn!("Could not clear language setting {:?}: {}", path, e);
                }
            }
        }
    }

    fn persist_language(&self) -> Result<()> {
        if let Some(path) = &self.settings_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let settings = LanguageSettings {
                language: Some(self.current.clone()),
            };
            std::fs::write(path, serde_json::to_string_pretty(&settings)?)?;
        }
        Ok(())
    }

    /// Saved setting, then system locale, then the fallback language.
    /// A saved setting that is unsupported or has no catalogs is cleared.
    pub fn detect_language(&self, system_locale: Option<&str>) -> String {
        if let Some(saved) = self.saved_language() {
            let usable = self.is_supported(&saved)
                && matches!(self.source.load(&saved, DEFAULT_NAMESPACE), Ok(Some(_)));
            if usable {
                return saved;
            }
            log::warn!("Ignoring saved language '{}'", saved);
            self.clear_saved_language();
        }

        if let Some(locale) = system_locale {
            let code = locale
                .split(['_', '-', '.'])
                .next()
                .unwrap_or_default()
                .to_lowercase();
            if self.is_supported(&code) {
                return code;
            }
        }

        self.fallback.clone()
    }

    /// Detect the language and load every registered namespace for it
    pub fn init(&mut self, system_locale: Option<&str>) -> Result<()> {
        if self.namespaces.is_empty() {
            self.namespaces.push(DEFAULT_NAMESPACE.to_string());
        }
        let language = self.detect_language(system_locale);
        log::info!("I18n: starting in '{}'", language);

        if language != self.fallback {
            let fallback = self.fallback.clone();
            let bundles = Self::load_bundles(self.source.as_ref(), &fallback, &self.namespaces, &fallback);
            self.install_bundles(&fallback, bundles);
        }
        let bundles = Self::load_bundles(self.source.as_ref(), &language, &self.namespaces, &self.fallback);
        self.install_bundles(&language, bundles);
        self.activate(&language).map(|_| ())
    }

    /// Load bundles for every namespace; blocking, suitable for a worker thread
    pub fn load_bundles(
        source: &dyn TranslationSource,
        language: &str,
        namespaces: &[String],
        fallback: &str,
    ) -> HashMap<String, Bundle> {
        namespaces
            .iter()
            .map(|namespace| {
                (
                    namespace.clone(),
                    load_translations(source, language, namespace, fallback),
                )
            })
            .collect()
    }

    pub fn install_bundles(&mut self, language: &str, bundles: HashMap<String, Bundle>) {
        self.resources
            .entry(language.to_string())
            .or_default()
            .extend(bundles);
    }

    /// Make `code` the active language without loading anything.
    /// Subscribers hear about the switch even when saving it fails.
    pub fn activate(&mut self, code: &str) -> Result<bool> {
        if !self.is_supported(code) {
            log::warn!("I18n: unsupported language '{}'", code);
            return Ok(false);
        }
        self.current = code.to_string();
        self.notifier.send_replace(self.current.clone());
        self.persist_language()?;
        Ok(true)
    }

    /// Load all registered namespaces for `code` and switch to it.
    /// Unsupported codes are ignored and reported as `false`.
    pub fn change_language(&mut self, code: &str) -> Result<bool> {
        if !self.is_supported(code) {
            log::warn!("I18n: unsupported language '{}'", code);
            return Ok(false);
        }
        let bundles = Self::load_bundles(self.source.as_ref(), code, &self.namespaces, &self.fallback);
        self.install_bundles(code, bundles);
        self.activate(code)
    }

    fn lookup(&self, language: &str, namespace: &str, key: &str) -> Option<&String> {
        self.resources.get(language)?.get(namespace)?.get(key)
    }

    /// Current language first, then the fallback, then the key itself
    pub fn translate(&self, namespace: &str, key: &str, params: &[(&str, &str)]) -> String {
        let text = self
            .lookup(&self.current, namespace, key)
            .or_else(|| self.lookup(&self.fallback, namespace, key))
            .map(String::as_str)
            .unwrap_or(key);
        interpolate(text, params)
    }

    /// Translator bound to `namespace`, or to the default namespace
    pub fn translator(&self, namespace: Option<&str>) -> Translator<'_> {
        Translator {
            i18n: self,
            namespace: namespace.unwrap_or(self.default_namespace()).to_string(),
            prefix: None,
        }
    }
}

/// Namespace-bound, optionally key-scoped view over an [`I18n`]
#[derive(Clone)]
pub struct Translator<'a> {
    i18n: &'a I18n,
    namespace: String,
    prefix: Option<String>,
}

impl<'a> Translator<'a> {
    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.to_string(),
        }
    }

    pub fn t(&self, key: &str) -> String {
        self.t_with(key, &[])
    }

    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.i18n
            .translate(&self.namespace, &self.full_key(key), params)
    }

    /// Nest further keys under `prefix`
    pub fn scope(&self, prefix: &str) -> Translator<'a> {
        Translator {
            i18n: self.i18n,
            namespace: self.namespace.clone(),
            prefix: Some(self.full_key(prefix)),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// Settings file location helper used by the app
pub fn settings_file(dir: &Path) -> PathBuf {
    dir.join("language.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_source() -> MemoryTranslationSource {
        MemoryTranslationSource::new()
            .with("en", "index", json!({"language": "language", "english": "English", "only_en": "fallback"}))
            .with("es", "index", json!({"language": "Idioma", "english": "Inglés"}))
            .with(
                "en",
                "hola",
                json!({"pruebaComponent": {"title": {"text": "Hello {{name}}"}, "description": "desc"}}),
            )
    }

    fn sample_i18n() -> I18n {
        let mut i18n = I18n::new(Arc::new(sample_source()));
        i18n.register_namespace("index");
        i18n.register_namespace("hola");
        i18n
    }

    #[test]
    fn test_flatten_keeps_strings_only() {
        let value = json!({
            "a": "x",
            "b": {"c": "y", "d": {"e": "z"}},
            "n": 5,
            "list": ["ignored"],
            "flag": true
        });
        let flat = flatten_translations(&value);
        assert_eq!(flat.len(), 3);
        assert_eq!(flat["a"], "x");
        assert_eq!(flat["b.c"], "y");
        assert_eq!(flat["b.d.e"], "z");
    }

    #[test]
    fn test_interpolate() {
        assert_eq!(interpolate("Hi {{name}}!", &[("name", "Ana")]), "Hi Ana!");
        assert_eq!(interpolate("{{a}}{{a}}{{b}}", &[("a", "1")]), "11{{b}}");
    }

    #[test]
    fn test_load_translations_falls_back_once() {
        let source = sample_source();
        let bundle = load_translations(&source, "es", "hola", "en");
        assert_eq!(bundle["pruebaComponent.description"], "desc");

        assert!(load_translations(&source, "es", "missing", "en").is_empty());
        assert!(load_translations(&source, "en", "missing", "en").is_empty());
    }

    #[test]
    fn test_load_translations_retries_after_error() {
        let mut source = MockTranslationSource::new();
        source
            .expect_load()
            .with(eq("es"), eq("index"))
            .times(1)
            .returning(|_, _| Err(WidgetLabError::Translation("offline".to_string())));
        source
            .expect_load()
            .with(eq("en"), eq("index"))
            .times(1)
            .returning(|_, _| Ok(Some(json!({"language": "language"}))));

        let bundle = load_translations(&source, "es", "index", "en");
        assert_eq!(bundle["language"], "language");
    }

    #[test]
    fn test_default_namespace() {
        let mut i18n = I18n::new(Arc::new(MemoryTranslationSource::new()));
        assert_eq!(i18n.default_namespace(), "index");
        i18n.register_namespace("hola");
        assert!(!i18n.register_namespace("hola"));
        assert_eq!(i18n.default_namespace(), "hola");
        assert_eq!(i18n.namespaces(), &["hola".to_string()]);
    }

    #[test]
    fn test_translate_with_fallbacks() {
        let mut i18n = sample_i18n();
        i18n.init(None).unwrap();
        assert!(i18n.change_language("es").unwrap());

        let t = i18n.translator(Some("index"));
        assert_eq!(t.t("language"), "Idioma");
        assert_eq!(t.t("only_en"), "fallback");
        assert_eq!(t.t("nope"), "nope");
    }

    #[test]
    fn test_scoped_translator() {
        let mut i18n = sample_i18n();
        i18n.init(None).unwrap();

        let t = i18n.translator(Some("hola")).scope("pruebaComponent").scope("title");
        assert_eq!(t.t_with("text", &[("name", "Sam")]), "Hello Sam");
        assert_eq!(t.namespace(), "hola");
    }

    #[test]
    fn test_change_language_rejects_unknown_code() {
        let mut i18n = sample_i18n();
        i18n.init(None).unwrap();
        assert!(!i18n.change_language("fr").unwrap());
        assert_eq!(i18n.current_language(), "en");
    }

    #[test]
    fn test_change_language_notifies() {
        let mut i18n = sample_i18n();
        i18n.init(None).unwrap();
        let mut receiver = i18n.subscribe();
        receiver.borrow_and_update();

        i18n.change_language("es").unwrap();
        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), "es");
        assert_eq!(i18n.current_language_name(), "Español");
        assert_eq!(i18n.next_language(), "en");
    }

    #[test]
    fn test_failed_save_still_notifies() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let mut i18n = sample_i18n().with_settings_path(Some(blocker.join("settings.json")));
        i18n.init(None).unwrap_err();
        let mut receiver = i18n.subscribe();
        receiver.borrow_and_update();

        assert!(i18n.change_language("es").is_err());
        assert_eq!(i18n.current_language(), "es");
        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), "es");
    }

    #[test]
    fn test_detect_language_from_locale() {
        let i18n = sample_i18n();
        assert_eq!(i18n.detect_language(Some("es_ES.UTF-8")), "es");
        assert_eq!(i18n.detect_language(Some("fr_FR.UTF-8")), "en");
        assert_eq!(i18n.detect_language(None), "en");
    }

    #[test]
    fn test_saved_language_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = settings_file(temp_dir.path());

        let mut i18n = sample_i18n().with_settings_path(Some(path.clone()));
        i18n.init(None).unwrap();
        i18n.change_language("es").unwrap();

        let mut restored = sample_i18n().with_settings_path(Some(path));
        restored.init(Some("en_US.UTF-8")).unwrap();
        assert_eq!(restored.current_language(), "es");
    }

    #[test]
    fn test_invalid_saved_language_is_cleared() {
        let temp_dir = TempDir::new().unwrap();
        let path = settings_file(temp_dir.path());
        std::fs::write(&path, r#"{"language": "fr"}"#).unwrap();

        let i18n = sample_i18n().with_settings_path(Some(path.clone()));
        assert_eq!(i18n.detect_language(Some("es_ES")), "es");
        assert!(!path.exists());
    }

    #[test]
    fn test_late_namespace_registration_loads_bundle() {
        let mut i18n = I18n::new(Arc::new(sample_source()));
        i18n.register_namespace("index");
        i18n.init(None).unwrap();
        assert!(!i18n.has_bundle("en", "hola"));

        i18n.register_namespace("hola");
        assert!(i18n.has_bundle("en", "hola"));
    }

    #[test]
    fn test_builtin_catalogs() {
        let mut i18n = I18n::new(Arc::new(MemoryTranslationSource::builtin()));
        i18n.register_namespace("index");
        i18n.register_namespace("explorer");
        i18n.init(None).unwrap();
        i18n.change_language("es").unwrap();

        assert_eq!(i18n.translator(None).t("language"), "Idioma");
        assert_eq!(
            i18n.translator(Some("explorer")).t("empty"),
            "No hay archivos ni carpetas"
        );
    }

    #[test]
    fn test_dir_source() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("en")).unwrap();
        std::fs::write(temp_dir.path().join("en/index.json"), r#"{"a": {"b": "c"}}"#).unwrap();

        let source = DirTranslationSource::new(temp_dir.path());
        assert_eq!(source.load("en", "index").unwrap(), Some(json!({"a": {"b": "c"}})));
        assert_eq!(source.load("es", "index").unwrap(), None);
        assert!(source.load("../en", "index").is_err());
    }

    #[test]
    fn test_cache_serves_and_invalidates() {
        let temp_dir = TempDir::new().unwrap();
        let cache_dir = temp_dir.path().join("cache");

        let mut inner = MockTranslationSource::new();
        inner
            .expect_load()
            .times(1)
            .returning(|_, _| Ok(Some(json!({"k": "v1"}))));
        let cached = CachedTranslationSource::new(inner, &cache_dir, "1");
        assert_eq!(cached.load("en", "index").unwrap(), Some(json!({"k": "v1"})));
        // Second read comes from disk
        assert_eq!(cached.load("en", "index").unwrap(), Some(json!({"k": "v1"})));
        assert!(cache_dir.join("i18n_cache__en_index.json").exists());

        let mut inner = MockTranslationSource::new();
        inner
            .expect_load()
            .times(1)
            .returning(|_, _| Ok(Some(json!({"k": "v2"}))));
        let rebuilt = CachedTranslationSource::new(inner, &cache_dir, "2");
        assert_eq!(rebuilt.load("en", "index").unwrap(), Some(json!({"k": "v2"})));
    }
}
