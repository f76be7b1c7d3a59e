//! Statement node variants (spec.md §3, §6.1).

use super::{
    ColumnDefinition, Expression, ScalarValue, SortDirection, StorageEngine, TableIdentifier,
};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateDatabaseStmt {
    pub name: String,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropDatabaseStmt {
    pub name: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UseStmt {
    pub database: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStmt {
    pub table_name: TableIdentifier,
    pub table_schema: Vec<ColumnDefinition>,
    pub if_not_exists: bool,
    pub storage_engine: StorageEngine,
    pub partition_by: Vec<String>,
    pub order_by: Vec<String>,
    pub settings: HashMap<String, ScalarValue>,
    pub compress: bool,
    pub encrypt: bool,
    pub encrypt_key: Option<String>,
}

impl CreateTableStmt {
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.table_schema.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStmt {
    pub table_name: TableIdentifier,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableAction {
    DropColumn(String),
    AlterColumn(ColumnDefinition),
    Settings(HashMap<String, ScalarValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStmt {
    pub table_name: TableIdentifier,
    pub action: AlterTableAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStmt {
    pub name: String,
    pub unique: bool,
    pub table_name: TableIdentifier,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropIndexStmt {
    pub name: String,
    pub table_name: TableIdentifier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateUserStmt {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropUserStmt {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterUserAction {
    SetPassword(String),
    SetUsername(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterUserStmt {
    pub name: String,
    pub action: AlterUserAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateProcedureStmt {
    pub name: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropProcedureStmt {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub name: TableIdentifier,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub distinct: bool,
    pub columns: Vec<Expression>,
    pub from: Vec<TableRef>,
    pub joins: Vec<JoinClause>,
    pub where_clause: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub order_by: Vec<(Expression, SortDirection)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub union: Option<Box<UnionClause>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionClause {
    pub all: bool,
    pub select: SelectStmt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: TableRef,
    pub on: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    pub table_name: TableIdentifier,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub table_name: TableIdentifier,
    pub assignments: Vec<(String, Expression)>,
    pub where_clause: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt {
    pub table_name: TableIdentifier,
    pub where_clause: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Privilege {
    Select,
    Insert,
    Update,
    Delete,
    All,
    Drop,
    Create,
    Connect,
    Alter,
    Revoke,
    Grant,
    Show,
    Exec,
    Explain,
    Print,
    Declare,
    Open,
    Close,
    Deallocate,
    Fetch,
    While,
    Return,
    Break,
    Set,
    Exit,
    Begin,
    Commit,
    Rollback,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GrantTarget {
    Table(TableIdentifier),
    AllInDatabase(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrantStmt {
    pub privileges: Vec<Privilege>,
    pub target: GrantTarget,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevokeStmt {
    pub privileges: Vec<Privilege>,
    pub target: GrantTarget,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShowStmt {
    Databases,
    Tables { from: Option<String> },
    Users,
    Indexes { table: TableIdentifier },
    Columns { table: TableIdentifier },
    CreateTable { table: TableIdentifier },
    Grants { user: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclareStmt {
    pub cursor_name: String,
    pub for_select: SelectStmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenStmt {
    pub cursor_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloseStmt {
    pub cursor_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeallocateStmt {
    pub cursor_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchStmt {
    pub cursor_name: String,
    pub into_variable: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expression,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub expr: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecStmt {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplainStmt {
    pub statement: Box<Statement>,
}

/// The closed set of statement variants accepted by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateDatabase(CreateDatabaseStmt),
    DropDatabase(DropDatabaseStmt),
    Use(UseStmt),
    CreateTable(CreateTableStmt),
    DropTable(DropTableStmt),
    AlterTable(AlterTableStmt),
    CreateIndex(CreateIndexStmt),
    DropIndex(DropIndexStmt),
    CreateUser(CreateUserStmt),
    DropUser(DropUserStmt),
    AlterUser(AlterUserStmt),
    CreateProcedure(CreateProcedureStmt),
    DropProcedure(DropProcedureStmt),
    Select(SelectStmt),
    Insert(InsertStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
    Begin,
    Commit,
    Rollback,
    Grant(GrantStmt),
    Revoke(RevokeStmt),
    Show(ShowStmt),
    Declare(DeclareStmt),
    Open(OpenStmt),
    Close(CloseStmt),
    Deallocate(DeallocateStmt),
    Fetch(FetchStmt),
    While(WhileStmt),
    Print(PrintStmt),
    Exec(ExecStmt),
    Explain(ExplainStmt),
}
