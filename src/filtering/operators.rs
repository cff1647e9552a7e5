use crate::query::{Boolean, DatePart};

/// The closed vocabulary of query verbs recognized as parameter keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Where,
    OrWhere,
    WhereIn,
    OrWhereIn,
    WhereNotIn,
    OrWhereNotIn,
    WhereBetween,
    OrWhereBetween,
    WhereNotBetween,
    OrWhereNotBetween,
    WhereNull,
    OrWhereNull,
    WhereNotNull,
    OrWhereNotNull,
    WhereHas,
    OrWhereHas,
    WhereDoesntHave,
    OrWhereDoesntHave,
    WhereDate,
    OrWhereDate,
    WhereDay,
    OrWhereDay,
    WhereMonth,
    OrWhereMonth,
    WhereYear,
    OrWhereYear,
    WhereTime,
    OrWhereTime,
    Search,
}

/// What an operator does with its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// `where` / `orWhere`: nested group, or `column = value` at leaf position
    Comparison,
    DatePart(DatePart),
    Membership { negated: bool },
    Range { negated: bool },
    /// Column names arrive in the value position
    Null { negated: bool },
    Existence { negated: bool },
    Search,
}

impl Operator {
    pub const ALL: [Self; 29] = [
        Self::Where,
        Self::OrWhere,
        Self::WhereIn,
        Self::OrWhereIn,
        Self::WhereNotIn,
        Self::OrWhereNotIn,
        Self::WhereBetween,
        Self::OrWhereBetween,
        Self::WhereNotBetween,
        Self::OrWhereNotBetween,
        Self::WhereNull,
        Self::OrWhereNull,
        Self::WhereNotNull,
        Self::OrWhereNotNull,
        Self::WhereHas,
        Self::OrWhereHas,
        Self::WhereDoesntHave,
        Self::OrWhereDoesntHave,
        Self::WhereDate,
        Self::OrWhereDate,
        Self::WhereDay,
        Self::OrWhereDay,
        Self::WhereMonth,
        Self::OrWhereMonth,
        Self::WhereYear,
        Self::OrWhereYear,
        Self::WhereTime,
        Self::OrWhereTime,
        Self::Search,
    ];

    /// Exact, case-sensitive match against the vocabulary
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|operator| operator.as_str() == key)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Where => "where",
            Self::OrWhere => "orWhere",
            Self::WhereIn => "whereIn",
            Self::OrWhereIn => "orWhereIn",
            Self::WhereNotIn => "whereNotIn",
            Self::OrWhereNotIn => "orWhereNotIn",
            Self::WhereBetween => "whereBetween",
            Self::OrWhereBetween => "orWhereBetween",
            Self::WhereNotBetween => "whereNotBetween",
            Self::OrWhereNotBetween => "orWhereNotBetween",
            Self::WhereNull => "whereNull",
            Self::OrWhereNull => "orWhereNull",
            Self::WhereNotNull => "whereNotNull",
            Self::OrWhereNotNull => "orWhereNotNull",
            Self::WhereHas => "whereHas",
            Self::OrWhereHas => "orWhereHas",
            Self::WhereDoesntHave => "whereDoesntHave",
            Self::OrWhereDoesntHave => "orWhereDoesntHave",
            Self::WhereDate => "whereDate",
            Self::OrWhereDate => "orWhereDate",
            Self::WhereDay => "whereDay",
            Self::OrWhereDay => "orWhereDay",
            Self::WhereMonth => "whereMonth",
            Self::OrWhereMonth => "orWhereMonth",
            Self::WhereYear => "whereYear",
            Self::OrWhereYear => "orWhereYear",
            Self::WhereTime => "whereTime",
            Self::OrWhereTime => "orWhereTime",
            Self::Search => "search",
        }
    }

    /// How the clause produced by this operator joins its siblings
    #[must_use]
    pub const fn boolean(self) -> Boolean {
        match self {
            Self::OrWhere
            | Self::OrWhereIn
            | Self::OrWhereNotIn
            | Self::OrWhereBetween
            | Self::OrWhereNotBetween
            | Self::OrWhereNull
            | Self::OrWhereNotNull
            | Self::OrWhereHas
            | Self::OrWhereDoesntHave
            | Self::OrWhereDate
            | Self::OrWhereDay
            | Self::OrWhereMonth
            | Self::OrWhereYear
            | Self::OrWhereTime => Boolean::Or,
            _ => Boolean::And,
        }
    }

    #[must_use]
    pub const fn family(self) -> Family {
        match self {
            Self::Where | Self::OrWhere => Family::Comparison,
            Self::WhereIn | Self::OrWhereIn => Family::Membership { negated: false },
            Self::WhereNotIn | Self::OrWhereNotIn => Family::Membership { negated: true },
            Self::WhereBetween | Self::OrWhereBetween => Family::Range { negated: false },
            Self::WhereNotBetween | Self::OrWhereNotBetween => Family::Range { negated: true },
            Self::WhereNull | Self::OrWhereNull => Family::Null { negated: false },
            Self::WhereNotNull | Self::OrWhereNotNull => Family::Null { negated: true },
            Self::WhereHas | Self::OrWhereHas => Family::Existence { negated: false },
            Self::WhereDoesntHave | Self::OrWhereDoesntHave => Family::Existence { negated: true },
            Self::WhereDate | Self::OrWhereDate => Family::DatePart(DatePart::Date),
            Self::WhereDay | Self::OrWhereDay => Family::DatePart(DatePart::Day),
            Self::WhereMonth | Self::OrWhereMonth => Family::DatePart(DatePart::Month),
            Self::WhereYear | Self::OrWhereYear => Family::DatePart(DatePart::Year),
            Self::WhereTime | Self::OrWhereTime => Family::DatePart(DatePart::Time),
            Self::Search => Family::Search,
        }
    }
}
