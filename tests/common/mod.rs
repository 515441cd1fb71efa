//! In-memory session for integration tests.
//!
//! Models the data dictionary directly and runs the statements the crate
//! generates against row vectors. Data changes are transactional; the
//! dictionary is not.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Once};

use chrono::{NaiveDate, NaiveDateTime};
use oracle_table_rs::{
    BufferedCursor, ColumnInfo, Error, ObjectKind, OracleValue, RawCollection, RawColumn, RawType,
    Record, Result, Row, Session, SynonymTarget,
};

static TRACING: Once = Once::new();

/// Install a fmt subscriber once, filtered by `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

type Key = (String, String);

fn key(owner: &str, name: &str) -> Key {
    (owner.to_uppercase(), name.to_uppercase())
}

#[derive(Debug, Clone, Default)]
struct TableData {
    columns: Vec<RawColumn>,
    rows: Vec<Vec<OracleValue>>,
    primary_key: Option<usize>,
}

impl TableData {
    fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.column_name == name)
            .ok_or_else(|| Error::oracle(904, format!("\"{}\": invalid identifier", name)))
    }
}

/// Failure injected for statements containing a substring.
struct Failure {
    needle: String,
    code: u32,
    message: String,
}

/// Session over in-memory tables, types and synonyms.
pub struct MemorySession {
    schema: String,
    objects: HashMap<Key, ObjectKind>,
    synonyms: HashMap<Key, SynonymTarget>,
    types: HashMap<Key, RawType>,
    committed: HashMap<Key, TableData>,
    working: HashMap<Key, TableData>,
    failures: Vec<Failure>,
    /// Every statement run through `execute` or `query`, with its binds.
    pub statements: Vec<(String, Vec<OracleValue>)>,
    /// Number of dictionary lookups answered.
    pub catalog_lookups: usize,
}

impl MemorySession {
    pub fn new(schema: &str) -> Self {
        Self {
            schema: schema.to_uppercase(),
            objects: HashMap::new(),
            synonyms: HashMap::new(),
            types: HashMap::new(),
            committed: HashMap::new(),
            working: HashMap::new(),
            failures: Vec::new(),
            statements: Vec::new(),
            catalog_lookups: 0,
        }
    }

    pub fn create_table(&mut self, owner: &str, name: &str, columns: Vec<RawColumn>) -> &mut Self {
        self.create_object(owner, name, ObjectKind::Table, columns)
    }

    pub fn create_view(&mut self, owner: &str, name: &str, columns: Vec<RawColumn>) -> &mut Self {
        self.create_object(owner, name, ObjectKind::View, columns)
    }

    fn create_object(
        &mut self,
        owner: &str,
        name: &str,
        kind: ObjectKind,
        columns: Vec<RawColumn>,
    ) -> &mut Self {
        let data = TableData {
            columns,
            ..TableData::default()
        };
        self.objects.insert(key(owner, name), kind);
        self.committed.insert(key(owner, name), data.clone());
        self.working.insert(key(owner, name), data);
        self
    }

    /// Reject inserts that repeat a value of `column`.
    pub fn primary_key(&mut self, owner: &str, name: &str, column: &str) -> &mut Self {
        for tables in [&mut self.committed, &mut self.working] {
            if let Some(data) = tables.get_mut(&key(owner, name)) {
                data.primary_key = data.column_index(&column.to_uppercase()).ok();
            }
        }
        self
    }

    pub fn drop_table(&mut self, owner: &str, name: &str) -> &mut Self {
        self.objects.remove(&key(owner, name));
        self.committed.remove(&key(owner, name));
        self.working.remove(&key(owner, name));
        self
    }

    pub fn create_type(&mut self, raw: RawType) -> &mut Self {
        self.types.insert(key(&raw.owner, &raw.name), raw);
        self
    }

    /// Synonym owned by `owner` (`PUBLIC` for a public synonym).
    pub fn create_synonym(
        &mut self,
        owner: &str,
        name: &str,
        target_owner: &str,
        target_name: &str,
    ) -> &mut Self {
        self.synonyms
            .insert(key(owner, name), SynonymTarget::new(target_owner, target_name));
        self
    }

    /// Fail every statement whose text contains `needle` with `ORA-<code>`.
    pub fn fail_when(&mut self, needle: &str, code: u32, message: &str) -> &mut Self {
        self.failures.push(Failure {
            needle: needle.to_string(),
            code,
            message: message.to_string(),
        });
        self
    }

    /// Committed rows of a table, in storage order.
    pub fn committed_rows(&self, owner: &str, name: &str) -> Vec<Vec<OracleValue>> {
        self.committed
            .get(&key(owner, name))
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    /// Last statement text run, if any.
    pub fn last_sql(&self) -> Option<&str> {
        self.statements.last().map(|(sql, _)| sql.as_str())
    }

    fn check_failures(&self, sql: &str) -> Result<()> {
        match self.failures.iter().find(|f| sql.contains(&f.needle)) {
            Some(f) => Err(Error::oracle(f.code, f.message.clone())),
            None => Ok(()),
        }
    }

    fn run(&mut self, sql: &str, binds: &[OracleValue]) -> Result<Outcome> {
        self.statements.push((sql.to_string(), binds.to_vec()));
        self.check_failures(sql)?;
        let tokens = tokenize(sql)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            binds,
            next_bind: 0,
            schema: &self.schema,
        };
        let statement = parser.statement()?;
        if parser.next_bind != binds.len() {
            return Err(Error::oracle(1008, "not all variables bound"));
        }
        statement.apply(&mut self.working)
    }
}

impl Session for MemorySession {
    type Rows<'a> = BufferedCursor;

    fn current_schema(&self) -> &str {
        &self.schema
    }

    async fn execute(&mut self, sql: &str, binds: &[OracleValue]) -> Result<u64> {
        match self.run(sql, binds)? {
            Outcome::Affected(n) => Ok(n),
            Outcome::Rows(..) => Err(Error::driver("execute called with a query")),
        }
    }

    async fn query(
        &mut self,
        sql: &str,
        binds: &[OracleValue],
        _fetch_size: u32,
    ) -> Result<BufferedCursor> {
        match self.run(sql, binds)? {
            Outcome::Rows(names, rows) => {
                let info = Arc::new(ColumnInfo::new(names));
                Ok(BufferedCursor::new(
                    rows.into_iter().map(|values| Row::new(values, info.clone())).collect(),
                ))
            }
            Outcome::Affected(_) => Err(Error::driver("query called with DML")),
        }
    }

    async fn commit(&mut self) -> Result<()> {
        self.committed = self.working.clone();
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.working = self.committed.clone();
        Ok(())
    }

    async fn describe_object(&mut self, owner: &str, name: &str) -> Result<Option<ObjectKind>> {
        self.catalog_lookups += 1;
        Ok(self.objects.get(&key(owner, name)).copied())
    }

    async fn describe_synonym(&mut self, owner: &str, name: &str) -> Result<Option<SynonymTarget>> {
        self.catalog_lookups += 1;
        Ok(self.synonyms.get(&key(owner, name)).cloned())
    }

    async fn describe_table(&mut self, owner: &str, name: &str) -> Result<Vec<RawColumn>> {
        self.catalog_lookups += 1;
        Ok(self
            .committed
            .get(&key(owner, name))
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn describe_type(&mut self, owner: &str, name: &str) -> Result<Option<RawType>> {
        self.catalog_lookups += 1;
        Ok(self.types.get(&key(owner, name)).cloned())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn employee_columns() -> Vec<RawColumn> {
    let mut hire_date = RawColumn::new(4, "HIRE_DATE", "DATE");
    hire_date.data_length = Some(7);
    vec![
        RawColumn::new(1, "EMPLOYEE_ID", "NUMBER").with_number(22, Some(15), Some(0)),
        RawColumn::new(2, "FIRST_NAME", "VARCHAR2").with_length(50, "B"),
        RawColumn::new(3, "LAST_NAME", "VARCHAR2").with_length(50, "B"),
        hire_date,
    ]
}

pub fn address_type() -> RawType {
    RawType {
        owner: "HR".into(),
        name: "T_ADDRESS".into(),
        typecode: "OBJECT".into(),
        attributes: vec![
            RawColumn::new(1, "STREET", "VARCHAR2").with_length(50, "B"),
            RawColumn::new(2, "CITY", "VARCHAR2").with_length(50, "B"),
            RawColumn::new(3, "COUNTRY", "VARCHAR2").with_length(50, "B"),
        ],
        collection: None,
    }
}

pub fn phone_type() -> RawType {
    RawType {
        owner: "HR".into(),
        name: "T_PHONE".into(),
        typecode: "OBJECT".into(),
        attributes: vec![
            RawColumn::new(1, "TYPE", "VARCHAR2").with_length(10, "B"),
            RawColumn::new(2, "PHONE_NUMBER", "VARCHAR2").with_length(50, "B"),
        ],
        collection: None,
    }
}

pub fn phones_type() -> RawType {
    RawType {
        owner: "HR".into(),
        name: "T_PHONES".into(),
        typecode: "COLLECTION".into(),
        attributes: vec![],
        collection: Some(RawCollection {
            coll_type: "VARYING ARRAY".into(),
            upper_bound: Some(10),
            element: RawColumn::new(1, "ELEMENT", "T_PHONE").with_type_owner("HR"),
        }),
    }
}

/// Session of user HR with the employee tables, their types, a private
/// synonym and the public `DUAL` synonym.
pub fn hr_session() -> MemorySession {
    init_tracing();

    let mut session = MemorySession::new("HR");
    let mut employees2 = employee_columns();
    employees2.push(RawColumn::new(5, "ADDRESS", "T_ADDRESS").with_type_owner("HR"));
    employees2.push(RawColumn::new(6, "PHONES", "T_PHONES").with_type_owner("HR"));

    session
        .create_table("HR", "TEST_EMPLOYEES", employee_columns())
        .create_table("HR", "TEST_EMPLOYEES2", employees2)
        .create_type(address_type())
        .create_type(phone_type())
        .create_type(phones_type())
        .create_synonym("HR", "TEST_EMPLOYEES_SYNONYM", "HR", "TEST_EMPLOYEES")
        .create_table(
            "SYS",
            "DUAL",
            vec![RawColumn::new(1, "DUMMY", "VARCHAR2").with_length(1, "B")],
        )
        .create_synonym("PUBLIC", "DUAL", "SYS", "DUAL");
    session
}

pub fn hire_date(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

/// Employees 1 to 10.
pub fn employees() -> Vec<Record> {
    (1..=10)
        .map(|i: u32| {
            Record::new()
                .with("employee_id", i)
                .with("first_name", format!("First {}", i))
                .with("last_name", format!("Last {}", i))
                .with("hire_date", hire_date(i))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Statement interpreter
// ---------------------------------------------------------------------------

enum Outcome {
    Rows(Vec<String>, Vec<Vec<OracleValue>>),
    Affected(u64),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(String),
    Str(String),
    Bind,
    Sym(&'static str),
}

fn syntax_error() -> Error {
    Error::oracle(900, "invalid SQL statement")
}

fn tokenize(sql: &str) -> Result<Vec<Token>> {
    const SYMBOLS: [&str; 12] = ["<=", ">=", "<>", "!=", "=", "<", ">", "(", ")", ",", "*", "."];

    let chars: Vec<char> = sql.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || "_$#".contains(chars[i])) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            tokens.push(Token::Ident(word.to_uppercase()));
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            tokens.push(Token::Number(chars[start..i].iter().collect()));
        } else if c == '"' || c == '\'' {
            let mut text = String::new();
            i += 1;
            loop {
                match chars.get(i) {
                    None => return Err(Error::oracle(1756, "quoted string not properly terminated")),
                    Some(&q) if q == c && chars.get(i + 1) == Some(&c) => {
                        text.push(c);
                        i += 2;
                    }
                    Some(&q) if q == c => {
                        i += 1;
                        break;
                    }
                    Some(&other) => {
                        text.push(other);
                        i += 1;
                    }
                }
            }
            tokens.push(if c == '"' {
                Token::Ident(text)
            } else {
                Token::Str(text)
            });
        } else if c == ':' {
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Bind);
        } else {
            let rest: String = chars[i..chars.len().min(i + 2)].iter().collect();
            let symbol = *SYMBOLS
                .iter()
                .find(|s| rest.starts_with(**s))
                .ok_or_else(syntax_error)?;
            i += symbol.len();
            tokens.push(Token::Sym(symbol));
        }
    }
    Ok(tokens)
}

#[derive(Debug)]
enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug)]
enum Condition {
    Compare(String, Op, OracleValue),
    IsNull(String, bool),
}

#[derive(Debug)]
enum OrderItem {
    Column(String, bool),
    Position(usize, bool),
}

enum Projection {
    Count,
    Columns(Vec<String>),
}

enum Statement {
    Insert {
        table: Key,
        columns: Vec<String>,
        values: Vec<OracleValue>,
    },
    Select {
        table: Key,
        projection: Projection,
        filter: Vec<Condition>,
        order: Vec<OrderItem>,
    },
    Update {
        table: Key,
        assignments: Vec<(String, OracleValue)>,
        filter: Vec<Condition>,
    },
    Delete {
        table: Key,
        filter: Vec<Condition>,
    },
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    binds: &'a [OracleValue],
    next_bind: usize,
    schema: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn at_keyword(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(w)) if w == word)
    }

    fn keyword(&mut self, word: &str) -> Result<()> {
        if self.at_keyword(word) {
            self.pos += 1;
            Ok(())
        } else {
            Err(syntax_error())
        }
    }

    fn symbol(&mut self, symbol: &str) -> Result<()> {
        match self.advance() {
            Some(Token::Sym(s)) if s == symbol => Ok(()),
            _ => Err(syntax_error()),
        }
    }

    fn at_symbol(&self, symbol: &str) -> bool {
        matches!(self.peek(), Some(Token::Sym(s)) if *s == symbol)
    }

    fn ident(&mut self) -> Result<String> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name),
            _ => Err(syntax_error()),
        }
    }

    fn table(&mut self) -> Result<Key> {
        let first = self.ident()?;
        if self.at_symbol(".") {
            self.pos += 1;
            Ok((first, self.ident()?))
        } else {
            Ok((self.schema.to_string(), first))
        }
    }

    fn operand(&mut self) -> Result<OracleValue> {
        match self.advance() {
            Some(Token::Bind) => {
                let value = self
                    .binds
                    .get(self.next_bind)
                    .cloned()
                    .ok_or_else(|| Error::oracle(1008, "not all variables bound"))?;
                self.next_bind += 1;
                Ok(value)
            }
            Some(Token::Number(n)) => Ok(OracleValue::Number(n)),
            Some(Token::Str(s)) => Ok(OracleValue::String(s)),
            Some(Token::Ident(w)) if w == "NULL" => Ok(OracleValue::Null),
            _ => Err(syntax_error()),
        }
    }

    fn statement(&mut self) -> Result<Statement> {
        let statement = match self.ident()?.as_str() {
            "INSERT" => self.insert()?,
            "SELECT" => self.select()?,
            "UPDATE" => self.update()?,
            "DELETE" => {
                self.keyword("FROM")?;
                let table = self.table()?;
                let filter = self.filter()?;
                Statement::Delete { table, filter }
            }
            _ => return Err(syntax_error()),
        };
        if self.peek().is_some() {
            return Err(Error::oracle(933, "SQL command not properly ended"));
        }
        Ok(statement)
    }

    fn insert(&mut self) -> Result<Statement> {
        self.keyword("INTO")?;
        let table = self.table()?;
        self.symbol("(")?;
        let mut columns = vec![self.ident()?];
        while self.at_symbol(",") {
            self.pos += 1;
            columns.push(self.ident()?);
        }
        self.symbol(")")?;
        self.keyword("VALUES")?;
        self.symbol("(")?;
        let mut values = vec![self.operand()?];
        while self.at_symbol(",") {
            self.pos += 1;
            values.push(self.operand()?);
        }
        self.symbol(")")?;
        if columns.len() != values.len() {
            return Err(Error::oracle(913, "too many values"));
        }
        Ok(Statement::Insert {
            table,
            columns,
            values,
        })
    }

    fn select(&mut self) -> Result<Statement> {
        let projection = if self.at_keyword("COUNT") {
            self.pos += 1;
            self.symbol("(")?;
            self.symbol("*")?;
            self.symbol(")")?;
            Projection::Count
        } else {
            let mut columns = vec![self.ident()?];
            while self.at_symbol(",") {
                self.pos += 1;
                columns.push(self.ident()?);
            }
            Projection::Columns(columns)
        };
        self.keyword("FROM")?;
        let table = self.table()?;
        let filter = self.filter()?;

        let mut order = Vec::new();
        if self.at_keyword("ORDER") {
            self.pos += 1;
            self.keyword("BY")?;
            loop {
                let item = match self.advance() {
                    Some(Token::Ident(name)) => OrderItem::Column(name, false),
                    Some(Token::Number(n)) => {
                        OrderItem::Position(n.parse().map_err(|_| syntax_error())?, false)
                    }
                    _ => return Err(syntax_error()),
                };
                let descending = if self.at_keyword("DESC") {
                    self.pos += 1;
                    true
                } else {
                    if self.at_keyword("ASC") {
                        self.pos += 1;
                    }
                    false
                };
                order.push(match item {
                    OrderItem::Column(name, _) => OrderItem::Column(name, descending),
                    OrderItem::Position(p, _) => OrderItem::Position(p, descending),
                });
                if !self.at_symbol(",") {
                    break;
                }
                self.pos += 1;
            }
        }

        Ok(Statement::Select {
            table,
            projection,
            filter,
            order,
        })
    }

    fn update(&mut self) -> Result<Statement> {
        let table = self.table()?;
        self.keyword("SET")?;
        let mut assignments = Vec::new();
        loop {
            let column = self.ident()?;
            self.symbol("=")?;
            assignments.push((column, self.operand()?));
            if !self.at_symbol(",") {
                break;
            }
            self.pos += 1;
        }
        let filter = self.filter()?;
        Ok(Statement::Update {
            table,
            assignments,
            filter,
        })
    }

    fn filter(&mut self) -> Result<Vec<Condition>> {
        let mut conditions = Vec::new();
        if !self.at_keyword("WHERE") {
            return Ok(conditions);
        }
        self.pos += 1;
        loop {
            let column = self.ident()?;
            if self.at_keyword("IS") {
                self.pos += 1;
                let negated = self.at_keyword("NOT");
                if negated {
                    self.pos += 1;
                }
                self.keyword("NULL")?;
                conditions.push(Condition::IsNull(column, negated));
            } else {
                let op = match self.advance() {
                    Some(Token::Sym("=")) => Op::Eq,
                    Some(Token::Sym("<>")) | Some(Token::Sym("!=")) => Op::Ne,
                    Some(Token::Sym("<")) => Op::Lt,
                    Some(Token::Sym("<=")) => Op::Le,
                    Some(Token::Sym(">")) => Op::Gt,
                    Some(Token::Sym(">=")) => Op::Ge,
                    _ => return Err(syntax_error()),
                };
                conditions.push(Condition::Compare(column, op, self.operand()?));
            }
            if !self.at_keyword("AND") {
                break;
            }
            self.pos += 1;
        }
        Ok(conditions)
    }
}

/// Oracle-style comparison; `None` when either side is NULL.
fn compare(a: &OracleValue, b: &OracleValue) -> Option<Ordering> {
    match (a, b) {
        (OracleValue::Null, _) | (_, OracleValue::Null) => None,
        (OracleValue::Number(_), _) | (_, OracleValue::Number(_)) => {
            let x: f64 = a.as_str()?.trim().parse().ok()?;
            let y: f64 = b.as_str()?.trim().parse().ok()?;
            x.partial_cmp(&y)
        }
        (OracleValue::String(x), OracleValue::String(y)) => Some(x.cmp(y)),
        (OracleValue::Date(x), OracleValue::Date(y)) => Some(x.cmp(y)),
        _ => (a == b).then_some(Ordering::Equal),
    }
}

fn matches(data: &TableData, row: &[OracleValue], filter: &[Condition]) -> Result<bool> {
    for condition in filter {
        let hit = match condition {
            Condition::IsNull(column, negated) => row[data.column_index(column)?].is_null() != *negated,
            Condition::Compare(column, op, value) => {
                match compare(&row[data.column_index(column)?], value) {
                    None => false,
                    Some(ordering) => match op {
                        Op::Eq => ordering == Ordering::Equal,
                        Op::Ne => ordering != Ordering::Equal,
                        Op::Lt => ordering == Ordering::Less,
                        Op::Le => ordering != Ordering::Greater,
                        Op::Gt => ordering == Ordering::Greater,
                        Op::Ge => ordering != Ordering::Less,
                    },
                }
            }
        };
        if !hit {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Sort key comparison with NULLs last, as Oracle does for ascending order.
fn order_values(a: &OracleValue, b: &OracleValue) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => compare(a, b).unwrap_or(Ordering::Equal),
    }
}

impl Statement {
    fn apply(self, tables: &mut HashMap<Key, TableData>) -> Result<Outcome> {
        let table_key = match &self {
            Statement::Insert { table, .. }
            | Statement::Select { table, .. }
            | Statement::Update { table, .. }
            | Statement::Delete { table, .. } => table.clone(),
        };
        let data = tables
            .get_mut(&table_key)
            .ok_or_else(|| Error::oracle(942, "table or view does not exist"))?;

        match self {
            Statement::Insert {
                columns, values, ..
            } => {
                let mut row = vec![OracleValue::Null; data.columns.len()];
                for (column, value) in columns.iter().zip(values) {
                    row[data.column_index(column)?] = value;
                }
                if let Some(pk) = data.primary_key {
                    if data.rows.iter().any(|r| r[pk] == row[pk]) {
                        return Err(Error::oracle(1, "unique constraint violated"));
                    }
                }
                data.rows.push(row);
                Ok(Outcome::Affected(1))
            }
            Statement::Select {
                projection,
                filter,
                order,
                ..
            } => {
                let mut rows = Vec::new();
                for row in &data.rows {
                    if matches(data, row, &filter)? {
                        rows.push(row.clone());
                    }
                }

                let names = match projection {
                    Projection::Count => {
                        return Ok(Outcome::Rows(
                            vec!["COUNT(*)".to_string()],
                            vec![vec![OracleValue::Number(rows.len().to_string())]],
                        ))
                    }
                    Projection::Columns(columns) => columns,
                };
                let indices = names
                    .iter()
                    .map(|c| data.column_index(c))
                    .collect::<Result<Vec<_>>>()?;

                let mut sort_keys = Vec::new();
                for item in &order {
                    sort_keys.push(match item {
                        OrderItem::Column(name, desc) => (data.column_index(name)?, *desc),
                        OrderItem::Position(p, desc) => (
                            *indices
                                .get(p.wrapping_sub(1))
                                .ok_or_else(|| Error::oracle(1785, "ORDER BY item must be the number of a SELECT-list expression"))?,
                            *desc,
                        ),
                    });
                }
                rows.sort_by(|a, b| {
                    sort_keys
                        .iter()
                        .map(|&(i, desc)| {
                            let ordering = order_values(&a[i], &b[i]);
                            if desc {
                                ordering.reverse()
                            } else {
                                ordering
                            }
                        })
                        .find(|o| *o != Ordering::Equal)
                        .unwrap_or(Ordering::Equal)
                });

                let rows = rows
                    .into_iter()
                    .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                    .collect();
                Ok(Outcome::Rows(names, rows))
            }
            Statement::Update {
                assignments,
                filter,
                ..
            } => {
                let targets = assignments
                    .into_iter()
                    .map(|(column, value)| Ok((data.column_index(&column)?, value)))
                    .collect::<Result<Vec<_>>>()?;
                let mut hits = Vec::new();
                for (i, row) in data.rows.iter().enumerate() {
                    if matches(data, row, &filter)? {
                        hits.push(i);
                    }
                }
                for &i in &hits {
                    for (column, value) in &targets {
                        data.rows[i][*column] = value.clone();
                    }
                }
                Ok(Outcome::Affected(hits.len() as u64))
            }
            Statement::Delete { filter, .. } => {
                let mut kept = Vec::new();
                let before = data.rows.len();
                for row in std::mem::take(&mut data.rows) {
                    if !matches(data, &row, &filter)? {
                        kept.push(row);
                    }
                }
                data.rows = kept;
                Ok(Outcome::Affected((before - data.rows.len()) as u64))
            }
        }
    }
}
