//! ReQL Term Types - the protocol's term-type registry.
//!
//! Every query operation is identified on the wire by a stable integer tag.
//! The discriminants below are the protocol values and are append-only: new
//! operations get new numbers, existing numbers never move.
//!
//! # Term Categories
//!
//! - **Core Data**: DATUM, MAKE_ARRAY, MAKE_OBJ, BINARY
//! - **Variables & Functions**: VAR, IMPLICIT_VAR, FUNC, FUNCALL
//! - **Database Operations**: DB, DB_CREATE, DB_DROP, DB_LIST
//! - **Table Operations**: TABLE, TABLE_CREATE, TABLE_DROP, TABLE_LIST
//! - **Data Access**: GET, GET_ALL, BETWEEN
//! - **Transformations**: FILTER, MAP, CONCAT_MAP, ORDER_BY, DISTINCT
//! - **Joins**: INNER_JOIN, OUTER_JOIN, EQ_JOIN, ZIP
//! - **Aggregations**: COUNT, SUM, AVG, MIN, MAX, GROUP, UNGROUP, REDUCE
//! - **Math & Logic**: ADD … MOD, EQ … GE, AND, OR, NOT
//! - **Time**: TIME, ISO8601, EPOCH_TIME, NOW, accessors, MONDAY … DECEMBER
//! - **Control Flow**: BRANCH, FOR_EACH, ERROR, DEFAULT
//!
//! # Protocol version
//!
//! Tag values follow the `ql2.proto` registry of RethinkDB 2.2 and later
//! (wire protocol `V0_4`/`V1_0`). That registry renumbered `BETWEEN` to 182,
//! leaving 36 as `BETWEEN_DEPRECATED`, and added `VALUES` as 186. Older
//! optargs such as `use_outdated` and `datacenter` keep their names here;
//! the server decides whether it still honours them.
//!
//! # Example
//!
//! ```rust,ignore
//! use photondb_reql::reql::TermType;
//!
//! let term_type = TermType::from_u64(38).unwrap();
//! assert_eq!(term_type, TermType::Map);
//! assert_eq!(term_type.name(), "MAP");
//! ```

use crate::error::{Error, Result};

macro_rules! term_types {
    ($($variant:ident = $value:literal => $name:literal,)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u64)]
        pub enum TermType {
            $($variant = $value,)+
        }

        impl TermType {
            /// Every registered term type, in declaration order.
            pub const ALL: &'static [TermType] = &[$(TermType::$variant,)+];

            /// Converts from a wire tag.
            ///
            /// Returns `None` for tags this registry does not know.
            pub fn from_u64(value: u64) -> Option<Self> {
                match value {
                    $($value => Some(TermType::$variant),)+
                    _ => None,
                }
            }

            /// Returns the uppercase protocol name (e.g. `"FILTER"`).
            pub fn name(&self) -> &'static str {
                match self {
                    $(TermType::$variant => $name,)+
                }
            }
        }
    };
}

term_types! {
    // Core data
    Datum = 1 => "DATUM",
    MakeArray = 2 => "MAKE_ARRAY",
    MakeObj = 3 => "MAKE_OBJ",

    // Variables and evaluation
    Var = 10 => "VAR",
    Javascript = 11 => "JAVASCRIPT",
    Error = 12 => "ERROR",
    ImplicitVar = 13 => "IMPLICIT_VAR",

    // Data access
    Db = 14 => "DB",
    Table = 15 => "TABLE",
    Get = 16 => "GET",

    // Comparison
    Eq = 17 => "EQ",
    Ne = 18 => "NE",
    Lt = 19 => "LT",
    Le = 20 => "LE",
    Gt = 21 => "GT",
    Ge = 22 => "GE",
    Not = 23 => "NOT",

    // Arithmetic
    Add = 24 => "ADD",
    Sub = 25 => "SUB",
    Mul = 26 => "MUL",
    Div = 27 => "DIV",
    Mod = 28 => "MOD",

    // Documents and sequences
    Append = 29 => "APPEND",
    Slice = 30 => "SLICE",
    GetField = 31 => "GET_FIELD",
    HasFields = 32 => "HAS_FIELDS",
    Pluck = 33 => "PLUCK",
    Without = 34 => "WITHOUT",
    Merge = 35 => "MERGE",
    Reduce = 37 => "REDUCE",
    Map = 38 => "MAP",
    Filter = 39 => "FILTER",
    ConcatMap = 40 => "CONCAT_MAP",
    OrderBy = 41 => "ORDER_BY",
    Distinct = 42 => "DISTINCT",
    Count = 43 => "COUNT",
    Union = 44 => "UNION",
    Nth = 45 => "NTH",

    // Joins
    InnerJoin = 48 => "INNER_JOIN",
    OuterJoin = 49 => "OUTER_JOIN",
    EqJoin = 50 => "EQ_JOIN",

    // Types
    CoerceTo = 51 => "COERCE_TO",
    TypeOf = 52 => "TYPE_OF",

    // Writes
    Update = 53 => "UPDATE",
    Delete = 54 => "DELETE",
    Replace = 55 => "REPLACE",
    Insert = 56 => "INSERT",

    // Administration
    DbCreate = 57 => "DB_CREATE",
    DbDrop = 58 => "DB_DROP",
    DbList = 59 => "DB_LIST",
    TableCreate = 60 => "TABLE_CREATE",
    TableDrop = 61 => "TABLE_DROP",
    TableList = 62 => "TABLE_LIST",

    // Control flow
    Funcall = 64 => "FUNCALL",
    Branch = 65 => "BRANCH",
    Or = 66 => "OR",
    And = 67 => "AND",
    ForEach = 68 => "FOR_EACH",
    Func = 69 => "FUNC",
    Skip = 70 => "SKIP",
    Limit = 71 => "LIMIT",
    Zip = 72 => "ZIP",
    Asc = 73 => "ASC",
    Desc = 74 => "DESC",
    GetAll = 78 => "GET_ALL",
    Info = 79 => "INFO",
    Prepend = 80 => "PREPEND",
    Default = 92 => "DEFAULT",
    Contains = 93 => "CONTAINS",
    Keys = 94 => "KEYS",
    Json = 98 => "JSON",

    // Time
    Iso8601 = 99 => "ISO8601",
    ToIso8601 = 100 => "TO_ISO8601",
    EpochTime = 101 => "EPOCH_TIME",
    ToEpochTime = 102 => "TO_EPOCH_TIME",
    Now = 103 => "NOW",
    InTimezone = 104 => "IN_TIMEZONE",
    During = 105 => "DURING",
    Date = 106 => "DATE",
    Monday = 107 => "MONDAY",
    Tuesday = 108 => "TUESDAY",
    Wednesday = 109 => "WEDNESDAY",
    Thursday = 110 => "THURSDAY",
    Friday = 111 => "FRIDAY",
    Saturday = 112 => "SATURDAY",
    Sunday = 113 => "SUNDAY",
    January = 114 => "JANUARY",
    February = 115 => "FEBRUARY",
    March = 116 => "MARCH",
    April = 117 => "APRIL",
    May = 118 => "MAY",
    June = 119 => "JUNE",
    July = 120 => "JULY",
    August = 121 => "AUGUST",
    September = 122 => "SEPTEMBER",
    October = 123 => "OCTOBER",
    November = 124 => "NOVEMBER",
    December = 125 => "DECEMBER",
    TimeOfDay = 126 => "TIME_OF_DAY",
    Timezone = 127 => "TIMEZONE",
    Year = 128 => "YEAR",
    Month = 129 => "MONTH",
    Day = 130 => "DAY",
    DayOfWeek = 131 => "DAY_OF_WEEK",
    DayOfYear = 132 => "DAY_OF_YEAR",
    Hours = 133 => "HOURS",
    Minutes = 134 => "MINUTES",
    Seconds = 135 => "SECONDS",
    Time = 136 => "TIME",
    Literal = 137 => "LITERAL",

    // Later additions
    Object = 143 => "OBJECT",
    Group = 144 => "GROUP",
    Sum = 145 => "SUM",
    Avg = 146 => "AVG",
    Min = 147 => "MIN",
    Max = 148 => "MAX",
    Ungroup = 150 => "UNGROUP",
    Random = 151 => "RANDOM",
    Http = 153 => "HTTP",
    Args = 154 => "ARGS",
    Binary = 155 => "BINARY",
    Uuid = 169 => "UUID",
    Bracket = 170 => "BRACKET",
    Between = 182 => "BETWEEN",
    Values = 186 => "VALUES",
}

impl TermType {
    /// Converts to the wire tag.
    pub fn to_u64(self) -> u64 {
        self as u64
    }

    /// True for the calendar-name literals (MONDAY … DECEMBER).
    pub fn is_time_name(&self) -> bool {
        (TermType::Monday.to_u64()..=TermType::December.to_u64()).contains(&self.to_u64())
    }
}

impl TryFrom<u64> for TermType {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self> {
        TermType::from_u64(value).ok_or(Error::UnknownTermType(value))
    }
}

impl std::fmt::Display for TermType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_type_conversion() {
        assert_eq!(TermType::from_u64(1), Some(TermType::Datum));
        assert_eq!(TermType::from_u64(2), Some(TermType::MakeArray));
        assert_eq!(TermType::from_u64(17), Some(TermType::Eq));
        assert_eq!(TermType::from_u64(999), None);
    }

    #[test]
    fn test_term_type_to_u64() {
        assert_eq!(TermType::Datum.to_u64(), 1);
        assert_eq!(TermType::Table.to_u64(), 15);
        assert_eq!(TermType::Func.to_u64(), 69);
        assert_eq!(TermType::Time.to_u64(), 136);
    }

    #[test]
    fn test_term_type_names() {
        assert_eq!(TermType::Datum.name(), "DATUM");
        assert_eq!(TermType::Filter.name(), "FILTER");
        assert_eq!(TermType::ImplicitVar.name(), "IMPLICIT_VAR");
    }

    #[test]
    fn test_registry_round_trips_every_tag() {
        for term_type in TermType::ALL {
            assert_eq!(TermType::from_u64(term_type.to_u64()), Some(*term_type));
        }
    }

    #[test]
    fn test_try_from_unknown_tag() {
        assert_eq!(TermType::try_from(4242), Err(Error::UnknownTermType(4242)));
    }

    #[test]
    fn test_time_names() {
        assert!(TermType::Monday.is_time_name());
        assert!(TermType::December.is_time_name());
        assert!(!TermType::TimeOfDay.is_time_name());
        assert!(!TermType::Date.is_time_name());
    }
}
