//! Format string compilation and rendering
//!
//! A format string is parsed once, when its formatter is built, into a list
//! of literal and field segments. Unknown attributes and unsupported
//! conversions are rejected at that point so rendering never fails.

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

use crate::config::Style;
use crate::core::{LogError, LogResult};

/// Record attribute addressable from a format string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    /// Logger name
    Name,
    /// Numeric level
    LevelNo,
    /// Level name, such as `WARNING`
    LevelName,
    /// Rendered message
    Message,
    /// Creation time rendered with the date format
    AscTime,
    /// Creation time in seconds since the epoch
    Created,
    /// Millisecond part of the creation time
    Msecs,
    /// Milliseconds since logging start-up
    RelativeCreated,
    /// Source path of the call site
    PathName,
    /// File name part of the source path
    FileName,
    /// File name without extension
    Module,
    /// Source line of the call site
    LineNo,
    /// Name of the enclosing span
    FuncName,
    /// Numeric id of the emitting thread
    Thread,
    /// Name of the emitting thread
    ThreadName,
    /// Process id
    Process,
    /// tracing target of the event
    Target,
}

impl Attr {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "name" => Attr::Name,
            "levelno" => Attr::LevelNo,
            "levelname" => Attr::LevelName,
            "message" => Attr::Message,
            "asctime" => Attr::AscTime,
            "created" => Attr::Created,
            "msecs" => Attr::Msecs,
            "relativeCreated" => Attr::RelativeCreated,
            "pathname" => Attr::PathName,
            "filename" => Attr::FileName,
            "module" => Attr::Module,
            "lineno" => Attr::LineNo,
            "funcName" => Attr::FuncName,
            "thread" => Attr::Thread,
            "threadName" => Attr::ThreadName,
            "process" => Attr::Process,
            "target" => Attr::Target,
            _ => return None,
        })
    }

    fn is_numeric(self) -> bool {
        matches!(
            self,
            Attr::LevelNo
                | Attr::Created
                | Attr::Msecs
                | Attr::RelativeCreated
                | Attr::LineNo
                | Attr::Thread
                | Attr::Process
        )
    }
}

/// Value of one attribute for one record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// Text
    Str(Cow<'a, str>),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    /// Value rendered as-is
    Natural,
    /// Quoted text
    Repr,
    Int,
    Float,
    Hex,
    HexUpper,
}

#[derive(Debug, Clone, PartialEq)]
struct FieldSpec {
    fill: char,
    align: Option<Align>,
    zero: bool,
    plus: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: Conversion,
    /// Alignment used when none was written: `%` fields align right,
    /// `{}` text aligns left
    default_align: Align,
}

impl FieldSpec {
    fn new(default_align: Align) -> Self {
        Self {
            fill: ' ',
            align: None,
            zero: false,
            plus: false,
            width: None,
            precision: None,
            conversion: Conversion::Natural,
            default_align,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field { attr: Attr, spec: FieldSpec },
}

/// A compiled format string
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    source: String,
    style: Style,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile `source` in the given placeholder style
    pub fn parse(source: &str, style: Style) -> LogResult<Self> {
        let segments = Parser::new(source, style).run()?;
        if !segments.iter().any(|s| matches!(s, Segment::Field { .. })) {
            return Err(LogError::format(
                source,
                format!("no fields for '{style}' style"),
            ));
        }
        Ok(Self {
            source: source.to_string(),
            style,
            segments,
        })
    }

    /// The format string as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder style
    pub fn style(&self) -> Style {
        self.style
    }

    /// Whether the pattern references `attr`
    pub fn uses(&self, attr: Attr) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Field { attr: a, .. } if *a == attr))
    }

    /// Render with values supplied by `value`
    pub fn render<'a>(&self, value: impl Fn(Attr) -> FieldValue<'a>) -> String {
        let mut out = String::with_capacity(self.source.len() + 64);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { attr, spec } => render_field(&mut out, value(*attr), spec),
            }
        }
        out
    }
}

struct Parser<'s> {
    source: &'s str,
    style: Style,
    chars: Peekable<Chars<'s>>,
    segments: Vec<Segment>,
    literal: String,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str, style: Style) -> Self {
        Self {
            source,
            style,
            chars: source.chars().peekable(),
            segments: Vec::new(),
            literal: String::new(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> LogError {
        LogError::format(self.source, reason)
    }

    fn run(mut self) -> LogResult<Vec<Segment>> {
        while let Some(c) = self.chars.next() {
            match (self.style, c) {
                (Style::Percent, '%') => self.percent()?,
                (Style::Brace, '{') => self.brace()?,
                (Style::Brace, '}') => {
                    if self.chars.next_if_eq(&'}').is_none() {
                        return Err(self.error("single '}' encountered"));
                    }
                    self.literal.push('}');
                }
                (Style::Dollar, '$') => self.dollar()?,
                (_, c) => self.literal.push(c),
            }
        }
        self.flush();
        Ok(self.segments)
    }

    fn flush(&mut self) {
        if !self.literal.is_empty() {
            self.segments
                .push(Segment::Literal(std::mem::take(&mut self.literal)));
        }
    }

    fn push_field(&mut self, attr: Attr, spec: FieldSpec) {
        self.flush();
        self.segments.push(Segment::Field { attr, spec });
    }

    fn attr(&self, name: &str) -> LogResult<Attr> {
        Attr::from_name(name).ok_or_else(|| self.error(format!("unknown attribute '{name}'")))
    }

    fn take_until(&mut self, end: char) -> LogResult<String> {
        let mut name = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == end => return Ok(name),
                Some(c) => name.push(c),
                None => return Err(self.error(format!("missing '{end}'"))),
            }
        }
    }

    fn number(&mut self) -> Option<usize> {
        let mut digits = String::new();
        while let Some(d) = self.chars.next_if(char::is_ascii_digit) {
            digits.push(d);
        }
        digits.parse().ok()
    }

    // %(name)[flags][width][.precision]conversion
    fn percent(&mut self) -> LogResult<()> {
        match self.chars.next() {
            Some('%') => {
                self.literal.push('%');
                return Ok(());
            }
            Some('(') => {}
            _ => return Err(self.error("expected '%(name)' placeholder")),
        }

        let name = self.take_until(')')?;
        let attr = self.attr(&name)?;
        let mut spec = FieldSpec::new(Align::Right);

        while let Some(flag) = self.chars.next_if(|c| "#0- +".contains(*c)) {
            match flag {
                '-' => spec.align = Some(Align::Left),
                '0' => spec.zero = true,
                '+' => spec.plus = true,
                _ => {}
            }
        }
        spec.width = self.number();
        if self.chars.next_if_eq(&'.').is_some() {
            spec.precision = Some(self.number().unwrap_or(0));
        }

        spec.conversion = match self.chars.next() {
            Some('s') => Conversion::Natural,
            Some('r' | 'a') => Conversion::Repr,
            Some('d' | 'i' | 'u') => Conversion::Int,
            Some('f' | 'F') => Conversion::Float,
            Some('x') => Conversion::Hex,
            Some('X') => Conversion::HexUpper,
            Some(other) => return Err(self.error(format!("unsupported conversion '{other}'"))),
            None => return Err(self.error("incomplete placeholder")),
        };
        if spec.align == Some(Align::Left) {
            spec.zero = false;
        }
        self.check_numeric(attr, &spec)?;
        self.push_field(attr, spec);
        Ok(())
    }

    // {name[!conversion][:format_spec]}
    fn brace(&mut self) -> LogResult<()> {
        if self.chars.next_if_eq(&'{').is_some() {
            self.literal.push('{');
            return Ok(());
        }

        let body = self.take_until('}')?;
        let (head, format_spec) = body.split_once(':').unwrap_or((body.as_str(), ""));
        let (name, bang) = match head.split_once('!') {
            Some((name, bang)) => (name, Some(bang)),
            None => (head, None),
        };
        let attr = self.attr(name)?;
        let default_align = if attr.is_numeric() {
            Align::Right
        } else {
            Align::Left
        };
        let mut spec = self.brace_spec(format_spec, default_align)?;

        match bang {
            None | Some("s") => {}
            Some("r" | "a") => spec.conversion = Conversion::Repr,
            Some(other) => return Err(self.error(format!("unsupported conversion '!{other}'"))),
        }
        self.check_numeric(attr, &spec)?;
        self.push_field(attr, spec);
        Ok(())
    }

    // [[fill]align][sign][#][0][width][.precision][type]
    fn brace_spec(&self, format_spec: &str, default_align: Align) -> LogResult<FieldSpec> {
        let mut spec = FieldSpec::new(default_align);
        let mut chars = format_spec.chars().peekable();

        let align_of = |c: char| match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::Right),
            _ => None,
        };
        let mut lookahead = format_spec.chars();
        match (lookahead.next(), lookahead.next()) {
            (Some(fill), Some(a)) if align_of(a).is_some() => {
                spec.fill = fill;
                spec.align = align_of(a);
                chars.next();
                chars.next();
            }
            (Some(a), _) if align_of(a).is_some() => {
                spec.align = align_of(a);
                chars.next();
            }
            _ => {}
        }

        if let Some(sign) = chars.next_if(|c| matches!(c, '+' | '-' | ' ')) {
            spec.plus = sign == '+';
        }
        chars.next_if_eq(&'#');
        if chars.next_if_eq(&'0').is_some() {
            spec.zero = true;
        }

        let mut digits = String::new();
        while let Some(d) = chars.next_if(char::is_ascii_digit) {
            digits.push(d);
        }
        spec.width = digits.parse().ok();

        if chars.next_if_eq(&'.').is_some() {
            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            spec.precision = Some(digits.parse().unwrap_or(0));
        }

        spec.conversion = match chars.next() {
            None | Some('s') => Conversion::Natural,
            Some('d' | 'n') => Conversion::Int,
            Some('f' | 'F') => Conversion::Float,
            Some('x') => Conversion::Hex,
            Some('X') => Conversion::HexUpper,
            Some(other) => {
                return Err(self.error(format!("unsupported format type '{other}'")));
            }
        };
        if chars.next().is_some() {
            return Err(self.error(format!("invalid format spec '{format_spec}'")));
        }
        Ok(spec)
    }

    // $name, ${name}, $$
    fn dollar(&mut self) -> LogResult<()> {
        if self.chars.next_if_eq(&'$').is_some() {
            self.literal.push('$');
            return Ok(());
        }
        let name = if self.chars.next_if_eq(&'{').is_some() {
            self.take_until('}')?
        } else {
            let mut name = String::new();
            while let Some(c) = self.chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
                name.push(c);
            }
            if name.is_empty() {
                return Err(self.error("invalid placeholder after '$'"));
            }
            name
        };
        let attr = self.attr(&name)?;
        self.push_field(attr, FieldSpec::new(Align::Left));
        Ok(())
    }

    fn check_numeric(&self, attr: Attr, spec: &FieldSpec) -> LogResult<()> {
        let numeric = matches!(
            spec.conversion,
            Conversion::Int | Conversion::Float | Conversion::Hex | Conversion::HexUpper
        );
        if numeric && !attr.is_numeric() {
            return Err(self.error(format!(
                "attribute '{attr:?}' is text and cannot use a numeric conversion"
            )));
        }
        Ok(())
    }
}

fn render_field(out: &mut String, value: FieldValue<'_>, spec: &FieldSpec) {
    let numeric = !matches!(value, FieldValue::Str(_));
    let body: Cow<'_, str> = match (spec.conversion, &value) {
        (Conversion::Natural, FieldValue::Str(s)) => match spec.precision {
            Some(p) => Cow::Owned(s.chars().take(p).collect()),
            None => Cow::Borrowed(s.as_ref()),
        },
        (Conversion::Repr, FieldValue::Str(s)) => Cow::Owned(format!("'{s}'")),
        (Conversion::Natural | Conversion::Repr, FieldValue::Int(i)) => Cow::Owned(signed(*i, spec.plus)),
        (Conversion::Natural | Conversion::Repr, FieldValue::Float(f)) => match spec.precision {
            Some(p) => Cow::Owned(signed_float(*f, p, spec.plus)),
            None => Cow::Owned(display_float(*f)),
        },
        (Conversion::Int, FieldValue::Int(i)) => Cow::Owned(signed(*i, spec.plus)),
        (Conversion::Int, FieldValue::Float(f)) => Cow::Owned(signed(f.trunc() as i64, spec.plus)),
        (Conversion::Float, FieldValue::Int(i)) => {
            Cow::Owned(signed_float(*i as f64, spec.precision.unwrap_or(6), spec.plus))
        }
        (Conversion::Float, FieldValue::Float(f)) => {
            Cow::Owned(signed_float(*f, spec.precision.unwrap_or(6), spec.plus))
        }
        (Conversion::Hex, FieldValue::Int(i)) => Cow::Owned(format!("{i:x}")),
        (Conversion::Hex, FieldValue::Float(f)) => Cow::Owned(format!("{:x}", f.trunc() as i64)),
        (Conversion::HexUpper, FieldValue::Int(i)) => Cow::Owned(format!("{i:X}")),
        (Conversion::HexUpper, FieldValue::Float(f)) => {
            Cow::Owned(format!("{:X}", f.trunc() as i64))
        }
        // numeric conversions of text are rejected at parse time
        (_, FieldValue::Str(s)) => Cow::Borrowed(s.as_ref()),
    };
    pad(out, &body, spec, numeric);
}

fn pad(out: &mut String, body: &str, spec: &FieldSpec, numeric: bool) {
    let len = body.chars().count();
    let width = spec.width.unwrap_or(0);
    if len >= width {
        out.push_str(body);
        return;
    }
    let padding = width - len;

    if spec.zero && numeric && spec.align.is_none() {
        let (sign, digits) = match body.chars().next() {
            Some('-' | '+') => body.split_at(1),
            _ => ("", body),
        };
        out.push_str(sign);
        out.extend(std::iter::repeat_n('0', padding));
        out.push_str(digits);
        return;
    }

    let align = spec.align.unwrap_or(if numeric {
        Align::Right
    } else {
        spec.default_align
    });
    let (before, after) = match align {
        Align::Left => (0, padding),
        Align::Right => (padding, 0),
        Align::Center => (padding / 2, padding - padding / 2),
    };
    out.extend(std::iter::repeat_n(spec.fill, before));
    out.push_str(body);
    out.extend(std::iter::repeat_n(spec.fill, after));
}

fn signed(i: i64, plus: bool) -> String {
    if plus && i >= 0 {
        format!("+{i}")
    } else {
        i.to_string()
    }
}

fn signed_float(f: f64, precision: usize, plus: bool) -> String {
    if plus && f >= 0.0 {
        format!("+{f:.precision$}")
    } else {
        format!("{f:.precision$}")
    }
}

fn display_float(f: f64) -> String {
    let s = f.to_string();
    if f.is_finite() && !s.contains(['.', 'e']) {
        format!("{s}.0")
    } else {
        s
    }
}
