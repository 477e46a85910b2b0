#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    /// `expr` is stored without the leading `=`. `cached` is the last result
    /// computed by a spreadsheet application, if any.
    Formula {
        expr: String,
        cached: Option<Box<CellValue>>,
    },
}

static EMPTY: CellValue = CellValue::Empty;

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }

    pub fn formula(expr: impl Into<String>) -> Self {
        let expr = expr.into();
        let expr = expr.strip_prefix('=').map(str::to_string).unwrap_or(expr);
        CellValue::Formula { expr, cached: None }
    }

    pub fn formula_with_cached(expr: impl Into<String>, cached: CellValue) -> Self {
        let expr = expr.into();
        let expr = expr.strip_prefix('=').map(str::to_string).unwrap_or(expr);
        let cached = match cached {
            CellValue::Empty => None,
            CellValue::Formula { cached, .. } => cached,
            other => Some(Box::new(other)),
        };
        CellValue::Formula { expr, cached }
    }

    /// Numeric when the whole trimmed string is a finite number, else text.
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        if trimmed.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(v) = trimmed.parse::<f64>() {
                if v.is_finite() {
                    return CellValue::Number(v);
                }
            }
        }
        CellValue::Text(raw.to_string())
    }

    /// The value a reader sees: literals as-is, formulas by their cached result.
    pub fn resolved(&self) -> &CellValue {
        match self {
            CellValue::Formula { cached, .. } => cached.as_deref().unwrap_or(&EMPTY),
            other => other,
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula { .. })
    }

    /// Formulas without a cached result have no known value yet.
    pub fn is_pending(&self) -> bool {
        matches!(self, CellValue::Formula { cached: None, .. })
    }

    pub fn is_blank(&self) -> bool {
        match self.resolved() {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Number, or text that parses as one.
    pub fn parse_number(&self) -> Option<f64> {
        match self.resolved() {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    pub fn display_text(&self) -> String {
        match self.resolved() {
            CellValue::Empty | CellValue::Formula { .. } => String::new(),
            CellValue::Number(v) => format_number(*v),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Drops a stale cached result; literals are unchanged.
    pub fn without_cache(&self) -> CellValue {
        match self {
            CellValue::Formula { expr, .. } => CellValue::Formula {
                expr: expr.clone(),
                cached: None,
            },
            other => other.clone(),
        }
    }
}

pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Round half away from zero; matches the spreadsheet `ROUND(x, 0)`.
pub fn round_half_away(v: f64) -> f64 {
    v.round()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellFormat {
    pub num_format: Option<String>,
    pub centered: bool,
}

impl CellFormat {
    pub fn is_default(&self) -> bool {
        self.num_format.is_none() && !self.centered
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/cell.rs"]
mod tests;
