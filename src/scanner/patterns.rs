use std::sync::LazyLock;

use regex::Regex;

// ==================== URL 模式注册表（声明式） ====================

struct PatternDef {
    label: &'static str,
    regex: &'static str,
}

/// 顺序即优先级；各模式域名/路径互斥，实际不会同一行命中多个
const PATTERN_DEFS: &[PatternDef] = &[
    PatternDef { label: "原神",           regex: r"https://webstatic\.mihoyo\.com/hk4e/event/\S+" },
    PatternDef { label: "崩坏：星穹铁道", regex: r"https://webstatic\.mihoyo\.com/hkrpg/\S+" },
    PatternDef { label: "绝区零",         regex: r"https://webstatic\.mihoyo\.com/nap/event/\S+" },
    PatternDef { label: "鸣潮",           regex: r"https://aki-gm-resources\.aki-game\.com/aki/gacha/index\.html#/\S+" },
];

pub struct UrlPattern {
    pub label: &'static str,
    pub regex: Regex,
}

pub static URL_PATTERNS: LazyLock<Vec<UrlPattern>> = LazyLock::new(|| {
    PATTERN_DEFS
        .iter()
        .map(|def| UrlPattern {
            label: def.label,
            regex: Regex::new(def.regex).expect("built-in URL pattern must compile"),
        })
        .collect()
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlMatch {
    pub label: &'static str,
    pub url: String,
}

/// 按声明顺序匹配单行，首个命中胜出
pub fn match_line(line: &str, patterns: &[UrlPattern]) -> Option<UrlMatch> {
    patterns.iter().find_map(|p| {
        p.regex.find(line).map(|m| UrlMatch {
            label: p.label,
            url: m.as_str().to_string(),
        })
    })
}
