use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// 配置文档整体不可用
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("top-level value is not an object")]
    NotAnObject,
}

// ==================== 配置文件位置 ====================

pub const CONFIG_FILE_NAME: &str = "config.json";
const APP_DIR_NAME: &str = "gacha-url-finder";

// ==================== 全局配置 ====================

/// 运行期只读配置，加载一次后按引用传给各组件
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Config {
    pub debug: bool,
    pub auto_connect: bool,
    pub auto_connect_ip: String,
    pub auto_connect_port: String,
    pub auto_copy: bool,
    /// 是否通过 getprop 查询设备型号
    pub query_model: bool,
    pub adb_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            auto_connect: false,
            auto_connect_ip: "127.0.0.1".into(),
            // MuMu 模拟器默认端口
            auto_connect_port: "16384".into(),
            auto_copy: true,
            query_model: true,
            adb_path: "adb".into(),
        }
    }
}

impl Config {
    /// auto-connect 目标 `ip:port`
    pub fn auto_connect_addr(&self) -> String {
        format!("{}:{}", self.auto_connect_ip, self.auto_connect_port)
    }

    /// 解析 JSON 文档并逐字段覆盖默认值
    ///
    /// 类型不符的字段保留默认值并产生一条警告；未知字段忽略。
    /// 整体语法错误或非对象文档返回 Err。
    pub fn from_json_str(text: &str) -> Result<(Self, Vec<String>), ConfigError> {
        if text.trim().is_empty() {
            return Ok((Self::default(), vec![]));
        }
        let doc: Value = serde_json::from_str(text)?;
        let Value::Object(map) = doc else {
            return Err(ConfigError::NotAnObject);
        };
        let mut config = Self::default();
        let mut warnings = vec![];
        config.overlay(&map, &mut warnings);
        Ok((config, warnings))
    }

    fn overlay(&mut self, map: &Map<String, Value>, warnings: &mut Vec<String>) {
        overlay_bool(map, "debug", &mut self.debug, warnings);
        overlay_bool(map, "auto_connect", &mut self.auto_connect, warnings);
        overlay_string(map, "auto_connect_ip", &mut self.auto_connect_ip, warnings);
        overlay_bool(map, "auto_copy", &mut self.auto_copy, warnings);
        overlay_bool(map, "query_model", &mut self.query_model, warnings);
        overlay_string(map, "adb_path", &mut self.adb_path, warnings);

        // 端口习惯写成数字，也接受
        match map.get("auto_connect_port") {
            None => {}
            Some(Value::String(s)) => self.auto_connect_port = s.clone(),
            Some(Value::Number(n)) if n.is_u64() => self.auto_connect_port = n.to_string(),
            Some(other) => warnings.push(type_warning("auto_connect_port", "string", other)),
        }
    }
}

fn overlay_bool(map: &Map<String, Value>, key: &str, slot: &mut bool, warnings: &mut Vec<String>) {
    match map.get(key) {
        None => {}
        Some(Value::Bool(b)) => *slot = *b,
        Some(other) => warnings.push(type_warning(key, "bool", other)),
    }
}

fn overlay_string(
    map: &Map<String, Value>,
    key: &str,
    slot: &mut String,
    warnings: &mut Vec<String>,
) {
    match map.get(key) {
        None => {}
        Some(Value::String(s)) => *slot = s.clone(),
        Some(other) => warnings.push(type_warning(key, "string", other)),
    }
}

fn type_warning(key: &str, expected: &str, got: &Value) -> String {
    format!("config key '{}' expects {}, got {}; using default", key, expected, got)
}

// ==================== 加载 ====================

/// 加载结果；警告留给日志初始化之后再输出
#[derive(Debug)]
pub struct Loaded {
    pub config: Config,
    /// 实际读取的文件，None 表示全部使用默认值
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// 候选配置文件：显式路径优先，其次当前目录，最后用户配置目录
pub fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(p) = explicit {
        return vec![p.to_path_buf()];
    }
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    paths
}

/// 永不失败：找不到文件静默用默认值，读取/解析失败带警告用默认值
pub fn load(explicit: Option<&Path>) -> Loaded {
    let candidates = candidate_paths(explicit);
    let Some(path) = candidates.iter().find(|p| p.is_file()) else {
        let warnings = match explicit {
            Some(p) => vec![format!("config file {} not found; using defaults", p.display())],
            None => vec![],
        };
        return Loaded {
            config: Config::default(),
            source: None,
            warnings,
        };
    };
    load_file(path)
}

pub fn load_file(path: &Path) -> Loaded {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            return Loaded {
                config: Config::default(),
                source: None,
                warnings: vec![format!("cannot read {}: {}; using defaults", path.display(), e)],
            };
        }
    };
    match Config::from_json_str(&text) {
        Ok((config, warnings)) => Loaded {
            config,
            source: Some(path.to_path_buf()),
            warnings,
        },
        Err(e) => Loaded {
            config: Config::default(),
            source: None,
            warnings: vec![format!("cannot parse {}: {}; using defaults", path.display(), e)],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert!(!c.debug);
        assert!(!c.auto_connect);
        assert!(c.auto_copy);
        assert!(c.query_model);
        assert_eq!(c.auto_connect_addr(), "127.0.0.1:16384");
        assert_eq!(c.adb_path, "adb");
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let (c, warnings) = Config::from_json_str("").unwrap();
        assert_eq!(c, Config::default());
        assert!(warnings.is_empty());

        let (c, warnings) = Config::from_json_str("{}").unwrap();
        assert_eq!(c, Config::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn partial_document_fills_missing_keys() {
        let (c, warnings) =
            Config::from_json_str(r#"{"debug": true, "auto_connect_ip": "10.0.0.2"}"#).unwrap();
        assert!(warnings.is_empty());
        assert!(c.debug);
        assert_eq!(c.auto_connect_ip, "10.0.0.2");
        assert_eq!(c.auto_connect_port, "16384");
        assert!(c.auto_copy);
        assert!(!c.auto_connect);
    }

    #[test]
    fn full_document() {
        let (c, _) = Config::from_json_str(
            r#"{
                "debug": true,
                "auto_connect": true,
                "auto_connect_ip": "192.168.1.5",
                "auto_connect_port": "5555",
                "auto_copy": false,
                "query_model": false,
                "adb_path": "/opt/platform-tools/adb"
            }"#,
        )
        .unwrap();
        assert!(c.auto_connect);
        assert_eq!(c.auto_connect_addr(), "192.168.1.5:5555");
        assert!(!c.auto_copy);
        assert!(!c.query_model);
        assert_eq!(c.adb_path, "/opt/platform-tools/adb");
    }

    #[test]
    fn unknown_keys_ignored() {
        let (c, warnings) = Config::from_json_str(r#"{"theme": "dark", "auto_copy": false}"#).unwrap();
        assert!(warnings.is_empty());
        assert!(!c.auto_copy);
    }

    #[test]
    fn wrong_type_keeps_default_and_warns() {
        let (c, warnings) =
            Config::from_json_str(r#"{"debug": "yes", "auto_copy": false}"#).unwrap();
        assert!(!c.debug);
        assert!(!c.auto_copy);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("debug"));
    }

    #[test]
    fn numeric_port_accepted() {
        let (c, warnings) = Config::from_json_str(r#"{"auto_connect_port": 7555}"#).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(c.auto_connect_port, "7555");
    }

    #[test]
    fn syntax_error_is_err() {
        let err = Config::from_json_str("{debug: true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(ref e) if e.is_syntax()));
        let err = Config::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, ConfigError::NotAnObject));
    }

    #[test]
    fn load_non_object_file_warns_with_reason() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let loaded = load_file(&path);
        assert_eq!(loaded.config, Config::default());
        assert!(loaded.source.is_none());
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("top-level value is not an object"));
    }

    #[test]
    fn load_missing_explicit_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let loaded = load(Some(&path));
        assert_eq!(loaded.config, Config::default());
        assert!(loaded.source.is_none());
        assert_eq!(loaded.warnings.len(), 1);
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"auto_connect": true}"#).unwrap();
        let loaded = load(Some(&path));
        assert!(loaded.config.auto_connect);
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn load_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json at all").unwrap();
        let loaded = load_file(&path);
        assert_eq!(loaded.config, Config::default());
        assert!(loaded.source.is_none());
        assert_eq!(loaded.warnings.len(), 1);
    }

    #[test]
    fn candidate_paths_explicit_only() {
        let p = PathBuf::from("/etc/custom.json");
        assert_eq!(candidate_paths(Some(&p)), vec![p]);
    }

    #[test]
    fn candidate_paths_default_starts_with_cwd() {
        let paths = candidate_paths(None);
        assert_eq!(paths[0], PathBuf::from(CONFIG_FILE_NAME));
    }
}
