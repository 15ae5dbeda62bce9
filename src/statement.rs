use crate::error::{ExecuteError, PrepareError};
use crate::row::Row;
use crate::table::Table;
use crate::{COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE};

// Non-SQL statements like .exit are called “meta-commands”.
#[derive(Debug, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    Unrecognized,
}

impl MetaCommand {
    pub fn parse(input: &str) -> Option<MetaCommand> {
        match input {
            ".exit" => Some(MetaCommand::Exit),
            _ if input.starts_with('.') => Some(MetaCommand::Unrecognized),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

impl Statement {
    /// Turns one input line into a validated statement.
    pub fn prepare(input: &str) -> Result<Statement, PrepareError> {
        let mut tokens = input.split_whitespace();
        match tokens.next() {
            Some("insert") => prepare_insert(tokens),
            Some("select") if tokens.next().is_none() => Ok(Statement::Select),
            _ => Err(PrepareError::UnrecognizedStatement(input.to_string())),
        }
    }

    /// Runs the statement, handing every selected row to `emit`.
    ///
    /// `emit` failures are the caller's own error type and stop the scan.
    pub fn execute<F, E>(&self, table: &mut Table, mut emit: F) -> Result<(), E>
    where
        F: FnMut(&Row) -> Result<(), E>,
        E: From<ExecuteError>,
    {
        match self {
            Statement::Insert(row) => Ok(table.insert(row)?),
            Statement::Select => {
                for row in table.select_all()? {
                    emit(&row.map_err(ExecuteError::from)?)?;
                }
                Ok(())
            }
        }
    }
}

fn prepare_insert<'a>(
    mut args: impl Iterator<Item = &'a str>,
) -> Result<Statement, PrepareError> {
    let (Some(id), Some(username), Some(email), None) =
        (args.next(), args.next(), args.next(), args.next())
    else {
        return Err(PrepareError::SyntaxError);
    };

    let id = parse_id(id)?;
    if username.len() > COLUMN_USERNAME_SIZE || email.len() > COLUMN_EMAIL_SIZE {
        return Err(PrepareError::StringTooLong);
    }
    // NUL marks the end of a text field on disk.
    if username.contains('\0') || email.contains('\0') {
        return Err(PrepareError::NulInString);
    }

    Ok(Statement::Insert(Row::new(id, username, email)))
}

fn parse_id(token: &str) -> Result<u32, PrepareError> {
    let id: i64 = match token.parse() {
        Ok(id) => id,
        // Too many digits for i64 still counts as a number.
        Err(_) if is_integer_literal(token) => {
            return Err(if token.starts_with('-') {
                PrepareError::NegativeId
            } else {
                PrepareError::IdOutOfRange
            });
        }
        Err(_) => return Err(PrepareError::InvalidId),
    };

    if id <= 0 {
        return Err(PrepareError::NegativeId);
    }
    u32::try_from(id).map_err(|_| PrepareError::IdOutOfRange)
}

fn is_integer_literal(token: &str) -> bool {
    let digits = token.strip_prefix(['-', '+']).unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, PartialEq, Eq)]
pub enum InputType {
    Meta(MetaCommand),
    Statement(Statement),
}

impl InputType {
    pub fn parse(input: &str) -> Result<InputType, PrepareError> {
        if let Some(meta) = MetaCommand::parse(input) {
            Ok(InputType::Meta(meta))
        } else {
            Statement::prepare(input).map(InputType::Statement)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn meta_commands() {
        assert_eq!(MetaCommand::parse(".exit"), Some(MetaCommand::Exit));
        assert_eq!(MetaCommand::parse(".tables"), Some(MetaCommand::Unrecognized));
        assert_eq!(MetaCommand::parse("select"), None);
    }

    #[test]
    fn prepares_insert() {
        assert_eq!(
            Statement::prepare("insert 1 user1 person1@example.com"),
            Ok(Statement::Insert(Row::new(1, "user1", "person1@example.com")))
        );
        assert_eq!(
            Statement::prepare("insert   7\tbob   bob@x.org"),
            Ok(Statement::Insert(Row::new(7, "bob", "bob@x.org")))
        );
    }

    #[test]
    fn prepares_select() {
        assert_eq!(Statement::prepare("select"), Ok(Statement::Select));
        assert!(matches!(
            Statement::prepare("select *"),
            Err(PrepareError::UnrecognizedStatement(_))
        ));
    }

    #[test]
    fn rejects_unknown_keywords() {
        assert_eq!(
            Statement::prepare("delete 1"),
            Err(PrepareError::UnrecognizedStatement("delete 1".to_string()))
        );
        assert!(matches!(
            Statement::prepare("insertx 1 a b"),
            Err(PrepareError::UnrecognizedStatement(_))
        ));
    }

    #[test]
    fn insert_needs_exactly_three_arguments() {
        assert_eq!(Statement::prepare("insert"), Err(PrepareError::SyntaxError));
        assert_eq!(Statement::prepare("insert 1 user1"), Err(PrepareError::SyntaxError));
        assert_eq!(
            Statement::prepare("insert 1 user1 a@b extra"),
            Err(PrepareError::SyntaxError)
        );
    }

    #[test]
    fn id_errors_are_distinguished() {
        assert_eq!(Statement::prepare("insert -1 a b"), Err(PrepareError::NegativeId));
        assert_eq!(Statement::prepare("insert 0 a b"), Err(PrepareError::NegativeId));
        assert_eq!(Statement::prepare("insert abc a b"), Err(PrepareError::InvalidId));
        assert_eq!(Statement::prepare("insert 12x a b"), Err(PrepareError::InvalidId));
        assert_eq!(
            Statement::prepare("insert 4294967296 a b"),
            Err(PrepareError::IdOutOfRange)
        );
        assert_eq!(
            Statement::prepare("insert 99999999999999999999999 a b"),
            Err(PrepareError::IdOutOfRange)
        );
        assert_eq!(
            Statement::prepare("insert -99999999999999999999999 a b"),
            Err(PrepareError::NegativeId)
        );
        assert!(Statement::prepare("insert 4294967295 a b").is_ok());
    }

    #[test]
    fn column_width_limits() {
        let name = "a".repeat(COLUMN_USERNAME_SIZE);
        let email = "b".repeat(COLUMN_EMAIL_SIZE);
        assert!(Statement::prepare(&format!("insert 1 {name} {email}")).is_ok());
        assert_eq!(
            Statement::prepare(&format!("insert 1 {name}a {email}")),
            Err(PrepareError::StringTooLong)
        );
        assert_eq!(
            Statement::prepare(&format!("insert 1 {name} {email}b")),
            Err(PrepareError::StringTooLong)
        );
    }

    #[test]
    fn text_with_nul_is_rejected() {
        assert_eq!(
            Statement::prepare("insert 1 a\0b c@d"),
            Err(PrepareError::NulInString)
        );
        assert_eq!(
            Statement::prepare("insert 1 ab c\0@d"),
            Err(PrepareError::NulInString)
        );
    }

    #[test]
    fn input_type_dispatch() {
        assert_eq!(InputType::parse(".exit"), Ok(InputType::Meta(MetaCommand::Exit)));
        assert_eq!(
            InputType::parse("select"),
            Ok(InputType::Statement(Statement::Select))
        );
        assert!(InputType::parse("bogus").is_err());
    }

    #[test]
    fn execute_insert_then_select() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();

        let insert = Statement::prepare("insert 1 user1 person1@example.com").unwrap();
        let inserted: Result<(), ExecuteError> = insert.execute(&mut table, |_| unreachable!());
        inserted.unwrap();

        let mut seen = Vec::new();
        let selected: Result<(), ExecuteError> = Statement::Select.execute(&mut table, |row| {
            seen.push(row.clone());
            Ok(())
        });
        selected.unwrap();
        assert_eq!(seen, vec![Row::new(1, "user1", "person1@example.com")]);
    }

    #[test]
    fn execute_select_on_empty_table() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();

        let result: Result<(), ExecuteError> = Statement::Select.execute(&mut table, |_| Ok(()));
        assert!(matches!(result, Err(ExecuteError::TableEmpty)));
    }
}
