//! Message catalogue and rule listings.

use serde::Serialize;

use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::error::Result;
use crate::lint::{Code, LintEngine, RuleCategory, RuleInfo};

const WIKI: &str = "https://github.com/Domain-Connect/dc-template-linter/wiki";

#[derive(Debug, Serialize)]
pub struct CodeInfo {
    pub code: Code,
    pub category: RuleCategory,
    pub note: &'static str,
    pub url: String,
}

impl From<Code> for CodeInfo {
    fn from(code: Code) -> Self {
        Self {
            code,
            category: code.category(),
            note: code.note(),
            url: format!("{WIKI}/{code}"),
        }
    }
}

pub fn explain(code: Code, robot: bool) -> Result<()> {
    let info = CodeInfo::from(code);
    if robot {
        return emit_json(&robot_ok(info));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("Code: {}", info.code));
    layout.kv("Category", &info.category.to_string());
    layout.kv("Note", info.note);
    layout.kv("More", &info.url);
    emit_human(layout);
    Ok(())
}

pub fn list_codes(robot: bool) -> Result<()> {
    let infos: Vec<CodeInfo> = Code::ALL.iter().copied().map(CodeInfo::from).collect();
    if robot {
        return emit_json(&robot_ok(infos));
    }
    emit_human(code_layout(&infos));
    Ok(())
}

fn code_layout(infos: &[CodeInfo]) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title("Message Codes");
    for (category, heading) in CATEGORIES {
        layout.section(heading);
        for info in infos.iter().filter(|info| info.category == category) {
            layout.kv(&info.code.to_string(), info.note);
        }
        layout.blank();
    }
    layout
}

pub fn list_rules(engine: &LintEngine, robot: bool) -> Result<()> {
    let rules = engine.list_rules();
    if robot {
        return emit_json(&robot_ok(rules));
    }
    emit_human(rule_layout(&rules));
    Ok(())
}

fn rule_layout(rules: &[RuleInfo]) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title("Validation Rules");
    for (category, heading) in CATEGORIES {
        let in_category: Vec<_> = rules.iter().filter(|r| r.category == category).collect();
        if in_category.is_empty() {
            continue;
        }
        layout.section(heading);
        for rule in in_category {
            let scope = if rule.per_record { "record" } else { "template" };
            let badge = if rule.enabled { "" } else { " [disabled]" };
            layout.bullet(&format!("{} - {} ({scope}){badge}", rule.id, rule.name));
        }
        layout.blank();
    }
    layout
}

const CATEGORIES: [(RuleCategory, &str); 4] = [
    (RuleCategory::System, "System"),
    (RuleCategory::Structure, "Structure"),
    (RuleCategory::Record, "Record"),
    (RuleCategory::Provider, "Cloudflare"),
];
