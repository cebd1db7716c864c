use glob::{MatchOptions, Pattern};

use crate::change::{ChangeStatus, FileChange};

// ── Types ──

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeOp {
    GreaterThan,
    LessThan,
}

#[derive(Debug, Clone)]
pub enum FilterRule {
    Glob { include: bool, pattern: Pattern },
    Status { include: bool, status: StatusKind },
    Size { include: bool, op: SizeOp, threshold: usize },
}

impl FilterRule {
    fn is_include(&self) -> bool {
        match self {
            FilterRule::Glob { include, .. } => *include,
            FilterRule::Status { include, .. } => *include,
            FilterRule::Size { include, .. } => *include,
        }
    }
}

// ── Parser ──

/// Parse a comma-separated filter expression into a list of rules.
/// Invalid globs are silently skipped.
pub fn parse_filter_expr(expr: &str) -> Vec<FilterRule> {
    let mut rules = Vec::new();
    for segment in expr.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        // Extract +/- prefix
        let (include, body) = if let Some(rest) = segment.strip_prefix('-') {
            (false, rest.trim())
        } else if let Some(rest) = segment.strip_prefix('+') {
            (true, rest.trim())
        } else {
            (true, segment)
        };

        if body.is_empty() {
            continue;
        }

        // Try size: >N or <N
        if let Some(rule) = try_parse_size(include, body) {
            rules.push(rule);
            continue;
        }

        // Try status keywords
        if let Some(rule) = try_parse_status(include, body) {
            rules.push(rule);
            continue;
        }

        // Otherwise treat as glob pattern
        if let Ok(pattern) = Pattern::new(body) {
            rules.push(FilterRule::Glob { include, pattern });
        }
    }
    rules
}

fn try_parse_size(include: bool, body: &str) -> Option<FilterRule> {
    let (op, num_str) = if let Some(rest) = body.strip_prefix('>') {
        (SizeOp::GreaterThan, rest)
    } else if let Some(rest) = body.strip_prefix('<') {
        (SizeOp::LessThan, rest)
    } else {
        return None;
    };
    let threshold = num_str.trim().parse::<usize>().ok()?;
    Some(FilterRule::Size { include, op, threshold })
}

fn try_parse_status(include: bool, body: &str) -> Option<FilterRule> {
    let status = match body.to_lowercase().as_str() {
        "added" => StatusKind::Added,
        "modified" => StatusKind::Modified,
        "deleted" => StatusKind::Deleted,
        "renamed" => StatusKind::Renamed,
        "unknown" => StatusKind::Unknown,
        _ => return None,
    };
    Some(FilterRule::Status { include, status })
}

// ── Evaluator ──

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Apply filter rules to a change. Returns true if it should be visible.
/// Include rules compose with OR; any matching exclude rule then removes.
pub fn apply_filter(rules: &[FilterRule], change: &FileChange) -> bool {
    if rules.is_empty() {
        return true;
    }

    let has_includes = rules.iter().any(|r| r.is_include());

    let included = if has_includes {
        rules.iter().any(|r| r.is_include() && matches_rule(r, change))
    } else {
        // No include rules → start with the whole change set
        true
    };

    if !included {
        return false;
    }

    let excluded = rules.iter().any(|r| !r.is_include() && matches_rule(r, change));

    !excluded
}

fn matches_rule(rule: &FilterRule, change: &FileChange) -> bool {
    match rule {
        FilterRule::Glob { pattern, .. } => pattern.matches_with(change.filename(), MATCH_OPTIONS),
        FilterRule::Status { status, .. } => matches_status(*status, change.status()),
        FilterRule::Size { op, threshold, .. } => {
            let changed = change.adds() + change.dels();
            match op {
                SizeOp::GreaterThan => changed > *threshold,
                SizeOp::LessThan => changed < *threshold,
            }
        }
    }
}

fn matches_status(kind: StatusKind, status: ChangeStatus) -> bool {
    matches!(
        (kind, status),
        (StatusKind::Added, ChangeStatus::Add)
            | (StatusKind::Modified, ChangeStatus::Modify)
            | (StatusKind::Deleted, ChangeStatus::Delete)
            | (StatusKind::Renamed, ChangeStatus::Rename)
            | (StatusKind::Unknown, ChangeStatus::Unknown)
    )
}
