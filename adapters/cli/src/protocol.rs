//! Line-oriented referee protocol: whitespace-separated integers in, two lines out.

use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
    num::ParseIntError,
};

use code_royale_core::{
    CodeError, Owner, Position, SiteId, SiteLayout, SiteReport, SiteStatus, StructureKind,
    TurnCommands, TurnSnapshot, Unit, UnitKind,
};
use thiserror::Error;

/// Wire value of the touched-site field when the queen touches nothing.
const NO_SITE: i32 = -1;
/// Upper bound on capacity reserved up front for a count read off the wire.
const MAX_PREALLOCATION: usize = 64;

/// Failures raised while decoding referee input.
#[derive(Debug, Error)]
pub(crate) enum ProtocolError {
    /// Input ended in the middle of a record.
    #[error("input ended while reading {field}")]
    UnexpectedEof {
        /// Field that was being read.
        field: &'static str,
    },
    /// A token could not be parsed as an integer.
    #[error("could not parse {field} from '{token}'")]
    InvalidNumber {
        /// Field that was being read.
        field: &'static str,
        /// Offending token.
        token: String,
        /// Underlying parse failure.
        #[source]
        source: ParseIntError,
    },
    /// A count field was negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeCount {
        /// Count that was being read.
        field: &'static str,
        /// Value received.
        value: i32,
    },
    /// An enumerated field carried an unknown wire code.
    #[error(transparent)]
    Code(#[from] CodeError),
    /// Reading from the underlying stream failed.
    #[error("failed to read referee input")]
    Io(#[from] io::Error),
}

/// Token reader over any buffered input stream.
#[derive(Debug)]
pub(crate) struct Reader<R> {
    input: R,
    tokens: VecDeque<String>,
}

impl<R: BufRead> Reader<R> {
    /// Wraps the provided stream.
    pub(crate) fn new(input: R) -> Self {
        Self {
            input,
            tokens: VecDeque::new(),
        }
    }

    /// Reads the site layout block sent once before the first turn.
    pub(crate) fn read_layouts(&mut self) -> Result<Vec<SiteLayout>, ProtocolError> {
        let count = self.count("site count")?;
        let mut layouts = Vec::with_capacity(count.min(MAX_PREALLOCATION));
        for _ in 0..count {
            let id = SiteId::new(self.int("site id")?);
            let x = self.int("site x")?;
            let y = self.int("site y")?;
            let radius = self.int("site radius")?;
            layouts.push(SiteLayout {
                id,
                position: Position::new(x, y),
                radius,
            });
        }
        Ok(layouts)
    }

    /// Reads one turn, returning `None` when input ends cleanly between turns.
    pub(crate) fn read_turn(
        &mut self,
        site_count: usize,
    ) -> Result<Option<TurnSnapshot>, ProtocolError> {
        let Some(token) = self.next_token()? else {
            return Ok(None);
        };
        let gold = parse("gold", token)?;
        let touched = self.int("touched site")?;
        let touched_site = (touched != NO_SITE).then(|| SiteId::new(touched));

        let mut sites = Vec::with_capacity(site_count);
        for _ in 0..site_count {
            sites.push(self.site_report()?);
        }

        let unit_count = self.count("unit count")?;
        let mut units = Vec::with_capacity(unit_count.min(MAX_PREALLOCATION));
        for _ in 0..unit_count {
            units.push(self.unit()?);
        }

        Ok(Some(TurnSnapshot {
            gold,
            touched_site,
            sites,
            units,
        }))
    }

    fn site_report(&mut self) -> Result<SiteReport, ProtocolError> {
        let id = SiteId::new(self.int("site id")?);
        let gold = self.int("site gold")?;
        let mine_size = self.int("mine size")?;
        let structure = StructureKind::from_code(self.int("structure type")?)?;
        let owner = Owner::from_code(self.int("site owner")?)?;
        let param1 = self.int("param1")?;
        let param2 = self.int("param2")?;
        Ok(SiteReport {
            id,
            status: SiteStatus {
                gold,
                mine_size,
                structure,
                owner,
                param1,
                param2,
            },
        })
    }

    fn unit(&mut self) -> Result<Unit, ProtocolError> {
        let x = self.int("unit x")?;
        let y = self.int("unit y")?;
        let owner = Owner::from_code(self.int("unit owner")?)?;
        let kind = UnitKind::from_code(self.int("unit type")?)?;
        let health = self.int("unit health")?;
        Ok(Unit::from_report(Position::new(x, y), owner, kind, health))
    }

    fn count(&mut self, field: &'static str) -> Result<usize, ProtocolError> {
        let value = self.int(field)?;
        usize::try_from(value).map_err(|_| ProtocolError::NegativeCount { field, value })
    }

    fn int(&mut self, field: &'static str) -> Result<i32, ProtocolError> {
        let token = self
            .next_token()?
            .ok_or(ProtocolError::UnexpectedEof { field })?;
        parse(field, token)
    }

    fn next_token(&mut self) -> Result<Option<String>, ProtocolError> {
        while self.tokens.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.tokens
                .extend(line.split_whitespace().map(str::to_owned));
        }
        Ok(self.tokens.pop_front())
    }
}

fn parse(field: &'static str, token: String) -> Result<i32, ProtocolError> {
    token
        .parse()
        .map_err(|source| ProtocolError::InvalidNumber {
            field,
            token,
            source,
        })
}

/// Writes the queen line and the training line, then flushes.
pub(crate) fn write_commands<W: Write>(output: &mut W, commands: &TurnCommands) -> io::Result<()> {
    writeln!(output, "{}", commands.queen)?;
    writeln!(output, "{}", commands.train)?;
    output.flush()
}
