//! The interpreter's built-in functions.
//!
//! Built-ins resolve by name before the global scope is consulted, so user
//! functions can never shadow them. Each group has its own submodule.

mod casts;
mod fs;
mod magic;
mod math;

use std::str::FromStr;

use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    error::RunResult,
    io::{PrintWriter, ScanSource},
    value::Value,
};

/// Enumerates every built-in function.
///
/// Uses strum derives so the call site's spelling (`"b"`, `"magic_number"`,
/// …) maps straight onto a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub(crate) enum Builtin {
    #[strum(serialize = "b")]
    CastBoolean,
    #[strum(serialize = "i")]
    CastInteger,
    #[strum(serialize = "f")]
    CastFloat,
    #[strum(serialize = "s")]
    CastString,
    #[strum(serialize = "a")]
    CastArray,
    #[strum(serialize = "h")]
    CastHashtable,
    #[strum(serialize = "stoa")]
    Stoa,
    #[strum(serialize = "reverse")]
    Reverse,
    #[strum(serialize = "print")]
    Print,
    #[strum(serialize = "scan")]
    Scan,
    #[strum(serialize = "type")]
    Type,
    #[strum(serialize = "hello")]
    Hello,
    #[strum(serialize = "mod")]
    Mod,
    #[strum(serialize = "floordiv")]
    Floordiv,
    #[strum(serialize = "magic_number")]
    MagicNumber,
    #[strum(serialize = "magic_weight")]
    MagicWeight,
    #[strum(serialize = "magic_uid")]
    MagicUid,
    #[strum(serialize = "magic_string")]
    MagicString,
    #[strum(serialize = "magic_time")]
    MagicTime,
    #[strum(serialize = "magic_date_time")]
    MagicDateTime,
    #[strum(serialize = "fread")]
    Fread,
    #[strum(serialize = "fwrite")]
    Fwrite,
}

impl Builtin {
    /// Looks a call target up in the built-in table.
    pub fn resolve(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }

    /// Calls this built-in with already-evaluated arguments.
    ///
    /// The random, time, and `hello` built-ins ignore surplus arguments;
    /// everything else checks its argument count.
    pub fn call(
        self,
        args: Vec<Value>,
        print: &mut impl PrintWriter,
        scan: &mut impl ScanSource,
    ) -> RunResult<Value> {
        match self {
            Self::CastBoolean => casts::cast_boolean(args),
            Self::CastInteger => casts::cast_integer(args),
            Self::CastFloat => casts::cast_float(args),
            Self::CastString => casts::cast_string(args),
            Self::CastArray => Ok(Value::array(args)),
            Self::CastHashtable => casts::cast_hashtable(args),
            Self::Stoa => casts::stoa(args),
            Self::Reverse => casts::reverse(args),
            Self::Print => {
                write_line(print, &args)?;
                Ok(Value::Bool(true))
            }
            Self::Scan => {
                let prompt = if args.is_empty() {
                    None
                } else {
                    Some(args.iter().map(Value::render).collect::<Vec<_>>().join(" "))
                };
                scan_line(print, scan, prompt.as_deref()).map(Value::string)
            }
            Self::Type => Ok(casts::type_of(args)),
            Self::Hello => {
                print.write("hello world!")?;
                print.push('\n')?;
                Ok(Value::Bool(true))
            }
            Self::Mod => math::modulo(args),
            Self::Floordiv => math::floordiv(args),
            Self::MagicNumber => Ok(magic::magic_number()),
            Self::MagicWeight => Ok(magic::magic_weight()),
            Self::MagicUid => Ok(magic::magic_uid()),
            Self::MagicString => Ok(magic::magic_string()),
            Self::MagicTime => Ok(magic::magic_time()),
            Self::MagicDateTime => Ok(magic::magic_date_time()),
            Self::Fread => fs::fread(args),
            Self::Fwrite => fs::fwrite(args),
        }
    }
}

/// Writes rendered values separated by spaces and terminated by a newline;
/// shared by the `>>` operator and the `print` builtin.
pub(crate) fn write_line(print: &mut impl PrintWriter, values: &[Value]) -> RunResult<()> {
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            print.push(' ')?;
        }
        print.write(&value.render())?;
    }
    print.push('\n')
}

/// Writes the prompt, if any, then reads one line; shared by the `<<`
/// operator and the `scan` builtin. The prompt is written exactly as
/// rendered, with nothing appended.
pub(crate) fn scan_line(
    print: &mut impl PrintWriter,
    scan: &mut impl ScanSource,
    prompt: Option<&str>,
) -> RunResult<String> {
    if let Some(prompt) = prompt {
        print.write(prompt)?;
    }
    scan.read_line()
}
