//! Token types for the MySQL lexer.

use std::borrow::Cow;
use std::fmt;

use super::Location;

/// Declares [`Keyword`] together with its grammar name and source spellings.
///
/// A bracketed list replaces the default spelling (the name itself), which
/// is how aliases such as `INT1` for `TINYINT` are expressed.
macro_rules! keywords {
    (@spellings $name:literal) => { &[$name] };
    (@spellings $name:literal [$($spelling:literal),+]) => { &[$($spelling),+] };
    ($($variant:ident => $name:literal $([$($spelling:literal),+])?,)*) => {
        /// MySQL reserved and non-reserved keywords.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            /// Every keyword, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// Returns the grammar name of this keyword.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Returns every source spelling that lexes as this keyword.
            #[must_use]
            pub const fn spellings(self) -> &'static [&'static str] {
                match self {
                    $(Self::$variant => keywords!(@spellings $name $([$($spelling),+])?),)*
                }
            }
        }
    };
}

keywords! {
    Add => "ADD",
    After => "AFTER",
    All => "ALL",
    Alter => "ALTER",
    Analyze => "ANALYZE",
    And => "AND",
    Any => "ANY",
    As => "AS",
    Asc => "ASC",
    AutoIncrement => "AUTO_INCREMENT",
    Before => "BEFORE",
    Begin => "BEGIN",
    Between => "BETWEEN",
    Bigint => "BIGINT" ["BIGINT", "INT8"],
    Binary => "BINARY",
    Bit => "BIT",
    Blob => "BLOB",
    Boolean => "BOOLEAN" ["BOOLEAN", "BOOL"],
    Both => "BOTH",
    By => "BY",
    Call => "CALL",
    Cascade => "CASCADE",
    Case => "CASE",
    Cast => "CAST",
    Change => "CHANGE",
    Char => "CHAR" ["CHAR", "CHARACTER"],
    Check => "CHECK",
    Close => "CLOSE",
    Collate => "COLLATE",
    Column => "COLUMN",
    Columns => "COLUMNS",
    Comment => "COMMENT",
    Condition => "CONDITION",
    Constraint => "CONSTRAINT",
    Continue => "CONTINUE",
    Convert => "CONVERT",
    Create => "CREATE",
    Cross => "CROSS",
    CurrentDate => "CURRENT_DATE",
    CurrentTime => "CURRENT_TIME",
    CurrentTimestamp => "CURRENT_TIMESTAMP",
    CurrentUser => "CURRENT_USER",
    Cursor => "CURSOR",
    Database => "DATABASE",
    Databases => "DATABASES",
    Date => "DATE",
    Datetime => "DATETIME",
    Day => "DAY",
    DayHour => "DAY_HOUR",
    DayMicrosecond => "DAY_MICROSECOND",
    DayMinute => "DAY_MINUTE",
    DaySecond => "DAY_SECOND",
    Decimal => "DECIMAL" ["DECIMAL", "DEC", "NUMERIC", "FIXED"],
    Declare => "DECLARE",
    Default => "DEFAULT",
    Delayed => "DELAYED",
    Delete => "DELETE",
    Desc => "DESC",
    Describe => "DESCRIBE",
    Deterministic => "DETERMINISTIC",
    Distinct => "DISTINCT",
    Distinctrow => "DISTINCTROW",
    Div => "DIV",
    Do => "DO",
    Double => "DOUBLE" ["DOUBLE", "FLOAT8"],
    Drop => "DROP",
    Dual => "DUAL",
    Each => "EACH",
    Else => "ELSE",
    Elseif => "ELSEIF",
    Enclosed => "ENCLOSED",
    End => "END",
    Enum => "ENUM",
    Escaped => "ESCAPED",
    Exit => "EXIT",
    Explain => "EXPLAIN",
    Fetch => "FETCH",
    First => "FIRST",
    Float => "FLOAT" ["FLOAT", "FLOAT4"],
    For => "FOR",
    Force => "FORCE",
    Foreign => "FOREIGN",
    Found => "FOUND",
    From => "FROM",
    Full => "FULL",
    Fulltext => "FULLTEXT",
    Function => "FUNCTION",
    Grant => "GRANT",
    Group => "GROUP",
    Handler => "HANDLER",
    Having => "HAVING",
    HighPriority => "HIGH_PRIORITY",
    Hour => "HOUR",
    HourMicrosecond => "HOUR_MICROSECOND",
    HourMinute => "HOUR_MINUTE",
    HourSecond => "HOUR_SECOND",
    If => "IF",
    Ignore => "IGNORE",
    In => "IN",
    Index => "INDEX",
    Infile => "INFILE",
    Inner => "INNER",
    Inout => "INOUT",
    Insensitive => "INSENSITIVE",
    Insert => "INSERT",
    Integer => "INTEGER" ["INTEGER", "INT", "INT4"],
    Interval => "INTERVAL",
    Into => "INTO",
    Is => "IS",
    Iterate => "ITERATE",
    Join => "JOIN",
    Key => "KEY",
    Keys => "KEYS",
    Kill => "KILL",
    Leading => "LEADING",
    Leave => "LEAVE",
    Left => "LEFT",
    Like => "LIKE",
    Limit => "LIMIT",
    Lines => "LINES",
    Load => "LOAD",
    Localtime => "LOCALTIME",
    Localtimestamp => "LOCALTIMESTAMP",
    Lock => "LOCK",
    Long => "LONG",
    Longblob => "LONGBLOB",
    Longtext => "LONGTEXT",
    Loop => "LOOP",
    LowPriority => "LOW_PRIORITY",
    Match => "MATCH",
    Mediumblob => "MEDIUMBLOB",
    Mediumint => "MEDIUMINT" ["MEDIUMINT", "MIDDLEINT", "INT3"],
    Mediumtext => "MEDIUMTEXT",
    Microsecond => "MICROSECOND",
    Minute => "MINUTE",
    MinuteMicrosecond => "MINUTE_MICROSECOND",
    MinuteSecond => "MINUTE_SECOND",
    Mod => "MOD",
    Modifies => "MODIFIES",
    Modify => "MODIFY",
    Month => "MONTH",
    Natural => "NATURAL",
    Next => "NEXT",
    Not => "NOT",
    NoWriteToBinlog => "NO_WRITE_TO_BINLOG",
    Null => "NULL",
    Offset => "OFFSET",
    On => "ON",
    OnDuplicate => "ONDUPLICATE" ["ON DUPLICATE"],
    Open => "OPEN",
    Optimize => "OPTIMIZE",
    Option => "OPTION",
    Optionally => "OPTIONALLY",
    Or => "OR",
    Order => "ORDER",
    Out => "OUT",
    Outer => "OUTER",
    Outfile => "OUTFILE",
    Precision => "PRECISION",
    Primary => "PRIMARY",
    Procedure => "PROCEDURE",
    Purge => "PURGE",
    Quarter => "QUARTER",
    Quick => "QUICK",
    Read => "READ",
    Reads => "READS",
    Real => "REAL",
    References => "REFERENCES",
    Regexp => "REGEXP" ["REGEXP", "RLIKE"],
    Release => "RELEASE",
    Rename => "RENAME",
    Repeat => "REPEAT",
    Replace => "REPLACE",
    Require => "REQUIRE",
    Restrict => "RESTRICT",
    Return => "RETURN",
    Returns => "RETURNS",
    Revoke => "REVOKE",
    Right => "RIGHT",
    Rollup => "ROLLUP",
    Schema => "SCHEMA",
    Schemas => "SCHEMAS",
    Second => "SECOND",
    SecondMicrosecond => "SECOND_MICROSECOND",
    Select => "SELECT",
    Sensitive => "SENSITIVE",
    Separator => "SEPARATOR",
    Set => "SET",
    Show => "SHOW",
    Smallint => "SMALLINT" ["SMALLINT", "INT2"],
    Some => "SOME",
    Soname => "SONAME",
    Spatial => "SPATIAL",
    Specific => "SPECIFIC",
    Sql => "SQL",
    SqlBigResult => "SQL_BIG_RESULT",
    SqlCalcFoundRows => "SQL_CALC_FOUND_ROWS",
    SqlSmallResult => "SQL_SMALL_RESULT",
    Sqlexception => "SQLEXCEPTION",
    Sqlstate => "SQLSTATE",
    Sqlwarning => "SQLWARNING",
    Ssl => "SSL",
    Starting => "STARTING",
    StraightJoin => "STRAIGHT_JOIN",
    Table => "TABLE",
    Tables => "TABLES",
    Temporary => "TEMPORARY",
    Terminated => "TERMINATED",
    Text => "TEXT",
    Then => "THEN",
    Time => "TIME",
    Timestamp => "TIMESTAMP",
    Tinyblob => "TINYBLOB",
    Tinyint => "TINYINT" ["TINYINT", "INT1"],
    Tinytext => "TINYTEXT",
    To => "TO",
    Trailing => "TRAILING",
    Trigger => "TRIGGER",
    Undo => "UNDO",
    Union => "UNION",
    Unique => "UNIQUE",
    Unlock => "UNLOCK",
    Unsigned => "UNSIGNED",
    Until => "UNTIL",
    Update => "UPDATE",
    Usage => "USAGE",
    Use => "USE",
    Using => "USING",
    UtcDate => "UTC_DATE",
    UtcTime => "UTC_TIME",
    UtcTimestamp => "UTC_TIMESTAMP",
    Values => "VALUES" ["VALUES", "VALUE"],
    Varbinary => "VARBINARY",
    Varchar => "VARCHAR" ["VARCHAR", "VARCHARACTER"],
    Varying => "VARYING",
    Week => "WEEK",
    When => "WHEN",
    Where => "WHERE",
    While => "WHILE",
    With => "WITH",
    Write => "WRITE",
    Xor => "XOR",
    Year => "YEAR",
    YearMonth => "YEAR_MONTH",
    Zerofill => "ZEROFILL",
}

impl Keyword {
    /// Looks up a keyword by any of its spellings, ignoring ASCII case.
    ///
    /// Multi-word spellings must use a single space between words.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| {
            k.spellings()
                .iter()
                .any(|spelling| spelling.eq_ignore_ascii_case(s))
        })
    }

    /// Looks up a keyword by its grammar name (exact, uppercase).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-token values distinguishing variants of one token kind.
pub mod sub {
    /// `<`
    pub const LT: i32 = 1;
    /// `>`
    pub const GT: i32 = 2;
    /// `!=` and `<>`
    pub const NE: i32 = 3;
    /// `=`
    pub const EQ: i32 = 4;
    /// `<=`
    pub const LE: i32 = 5;
    /// `>=`
    pub const GE: i32 = 6;
    /// `<=>`
    pub const NULL_SAFE_EQ: i32 = 12;

    /// `<<`
    pub const SHIFT_LEFT: i32 = 1;
    /// `>>`
    pub const SHIFT_RIGHT: i32 = 2;

    /// `EXISTS`
    pub const EXISTS: i32 = 0;
    /// `NOT EXISTS`
    pub const NOT_EXISTS: i32 = 1;

    pub const TRUE: i32 = 1;
    pub const FALSE: i32 = 0;
    pub const UNKNOWN: i32 = -1;
}

/// Token kinds, one per grammar terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword(Keyword),
    /// `TRUE`, `FALSE`, `UNKNOWN`.
    Bool,
    /// Comparison operators, told apart by sub-token.
    Comparison,
    /// `<<` and `>>`.
    Shift,
    /// `EXISTS` and `NOT EXISTS`.
    Exists,
    /// `:=`
    Assign,
    String,
    IntNum,
    ApproxNum,
    Name,
    UserVar,
    FCount,
    FTrim,
    FSubstring,
    FDateAdd,
    FDateSub,
    /// A single punctuation character from [`TokenKind::PUNCTUATION`].
    Punct(char),
    Eof,
}

impl TokenKind {
    /// Characters that lex as their own [`TokenKind::Punct`] token.
    pub const PUNCTUATION: &'static str = "-+&~|^/%*(),.;!:";

    const SPECIAL: [(Self, &'static str); 16] = [
        (Self::Bool, "BOOL"),
        (Self::Comparison, "COMPARISON"),
        (Self::Shift, "SHIFT"),
        (Self::Exists, "EXISTS"),
        (Self::Assign, "ASSIGN"),
        (Self::String, "STRING"),
        (Self::IntNum, "INTNUM"),
        (Self::ApproxNum, "APPROXNUM"),
        (Self::Name, "NAME"),
        (Self::UserVar, "USERVAR"),
        (Self::FCount, "FCOUNT"),
        (Self::FTrim, "FTRIM"),
        (Self::FSubstring, "FSUBSTRING"),
        (Self::FDateAdd, "FDATE_ADD"),
        (Self::FDateSub, "FDATE_SUB"),
        (Self::Eof, "$end"),
    ];

    /// Returns the terminal name used by the grammar.
    #[must_use]
    pub fn symbol_name(self) -> Cow<'static, str> {
        match self {
            Self::Keyword(k) => Cow::Borrowed(k.as_str()),
            Self::Punct(c) => Cow::Owned(format!("'{c}'")),
            other => Cow::Borrowed(
                Self::SPECIAL
                    .iter()
                    .find(|(kind, _)| *kind == other)
                    .map_or("?", |(_, name)| *name),
            ),
        }
    }

    /// Resolves a grammar terminal name back to a token kind.
    #[must_use]
    pub fn from_symbol_name(name: &str) -> Option<Self> {
        if let Some((kind, _)) = Self::SPECIAL.iter().find(|(_, n)| *n == name) {
            return Some(*kind);
        }
        let mut chars = name.chars();
        if let (Some('\''), Some(c), Some('\''), None) =
            (chars.next(), chars.next(), chars.next(), chars.next())
        {
            return Self::PUNCTUATION.contains(c).then_some(Self::Punct(c));
        }
        Keyword::from_name(name).map(Self::Keyword)
    }

    /// Every kind except [`TokenKind::Eof`].
    pub fn all() -> impl Iterator<Item = Self> {
        Keyword::ALL
            .iter()
            .map(|&k| Self::Keyword(k))
            .chain(
                Self::SPECIAL
                    .iter()
                    .map(|&(kind, _)| kind)
                    .filter(|kind| *kind != Self::Eof),
            )
            .chain(Self::PUNCTUATION.chars().map(Self::Punct))
    }

    /// Returns true for kinds whose value is a sub-token.
    #[must_use]
    pub const fn has_sub_token(self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Comparison | Self::Shift | Self::Exists
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol_name())
    }
}

/// The semantic value attached to a token.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TokenValue {
    #[default]
    None,
    Int(i64),
    Float(f64),
    Str(String),
    SubToken(i32),
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => f.write_str(s),
            Self::SubToken(n) => write!(f, "{n}"),
        }
    }
}

/// A classified token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    /// The matched source text.
    pub lexeme: String,
    pub location: Location,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(
        kind: TokenKind,
        value: TokenValue,
        lexeme: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            kind,
            value,
            lexeme: lexeme.into(),
            location,
        }
    }

    /// The end-of-input token.
    #[must_use]
    pub fn eof(location: Location) -> Self {
        Self::new(TokenKind::Eof, TokenValue::None, "", location)
    }

    /// Returns the sub-token, if this token carries one.
    #[must_use]
    pub const fn sub_token(&self) -> Option<i32> {
        match self.value {
            TokenValue::SubToken(n) => Some(n),
            _ => None,
        }
    }

    /// Whether this token can end an operand, which makes a `-` right after
    /// it a binary minus.
    #[must_use]
    pub const fn ends_operand(&self) -> bool {
        match self.kind {
            TokenKind::Name
            | TokenKind::UserVar
            | TokenKind::String
            | TokenKind::IntNum
            | TokenKind::ApproxNum
            | TokenKind::Bool => true,
            TokenKind::Punct(c) => c == ')',
            TokenKind::Keyword(k) => matches!(
                k,
                Keyword::Null
                    | Keyword::End
                    | Keyword::CurrentDate
                    | Keyword::CurrentTime
                    | Keyword::CurrentTimestamp
                    | Keyword::CurrentUser
                    | Keyword::Localtime
                    | Keyword::Localtimestamp
                    | Keyword::UtcDate
                    | Keyword::UtcTime
                    | Keyword::UtcTimestamp
            ),
            _ => false,
        }
    }

    /// Short human-readable description, used in syntax errors.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Keyword(_) | TokenKind::Punct(_) => self.kind.symbol_name().into_owned(),
            kind => format!("{kind} '{}'", self.lexeme),
        }
    }

    /// One line of the token trace: `line:col  KIND  [sub]  value`.
    #[must_use]
    pub fn trace_line(&self) -> String {
        let kind = self.kind.symbol_name();
        match (&self.value, self.kind) {
            (TokenValue::SubToken(n), _) => {
                format!("{}  {kind}  {n}  {}", self.location, self.lexeme)
            }
            (TokenValue::None, TokenKind::Keyword(_) | TokenKind::Punct(_)) => {
                format!("{}  {kind}  {}", self.location, self.lexeme)
            }
            (value, _) => format!("{}  {kind}  {value}", self.location),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.trace_line())
    }
}
