use std::str;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_till, take_till1};
use nom::character::complete::{char, digit1, line_ending, multispace0, multispace1, space0, space1};
use nom::combinator::{map, map_res, opt, verify};
use nom::multi::{count, many1};
use nom::number::complete::{double, le_f64};
use nom::sequence::{pair, preceded, separated_pair, tuple};
use nom::IResult;
use serde::Serialize;

use crate::error::{Error, Result};


type Res<'a, O> = IResult<&'a [u8], O>;

/// A single plot in a rawfile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis<'a> {
    pub title: &'a str,
    pub date: Option<&'a str>,
    /// The plot name, e.g. `DC transfer characteristic`.
    pub plotname: &'a str,
    pub flags: &'a str,
    pub num_variables: usize,
    pub num_points: usize,
    pub variables: Vec<Variable<'a>>,
    pub data: Data,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Variable<'a> {
    pub idx: usize,
    pub name: &'a str,
    /// The quantity written next to the variable, e.g. `voltage`.
    pub unit: &'a str,
}

/// Plot data, stored one vector per variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Data {
    Real(Vec<Vec<f64>>),
    Complex(Vec<ComplexSignal>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexSignal {
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
}

impl Data {
    #[inline]
    pub fn is_complex(&self) -> bool {
        matches!(self, Data::Complex(_))
    }

    /// Returns the real-valued variables, or `None` if the plot is complex.
    pub fn into_real(self) -> Option<Vec<Vec<f64>>> {
        match self {
            Data::Real(data) => Some(data),
            Data::Complex(_) => None,
        }
    }

    /// Returns the complex-valued variables, or `None` if the plot is real.
    pub fn into_complex(self) -> Option<Vec<ComplexSignal>> {
        match self {
            Data::Complex(data) => Some(data),
            Data::Real(_) => None,
        }
    }
}

struct Header<'a> {
    title: &'a str,
    date: Option<&'a str>,
    plotname: &'a str,
    flags: &'a str,
    num_variables: usize,
    num_points: usize,
    /// Total number of `f64` values in the data section.
    num_values: usize,
}

impl<'a> Header<'a> {
    fn from_fields(fields: &[(&'a str, &'a str)]) -> Result<Self> {
        let get = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| *v)
        };
        let parse_count = |key: &'static str| -> Result<usize> {
            let value = get(key).ok_or(Error::MissingField(key))?;
            value.parse().map_err(|_| Error::InvalidField {
                field: key,
                value: value.to_string(),
            })
        };

        let num_variables = parse_count("No. Variables")?;
        if num_variables == 0 {
            return Err(Error::InvalidField {
                field: "No. Variables",
                value: "0".to_string(),
            });
        }

        let num_points = parse_count("No. Points")?;
        let flags = get("Flags").unwrap_or("real");
        let width = if is_complex(flags) { 2 } else { 1 };
        let num_values = num_points
            .checked_mul(num_variables)
            .and_then(|n| n.checked_mul(width))
            .ok_or_else(|| Error::InvalidField {
                field: "No. Points",
                value: num_points.to_string(),
            })?;

        Ok(Self {
            title: get("Title").unwrap_or_default(),
            date: get("Date"),
            plotname: get("Plotname").ok_or(Error::MissingField("Plotname"))?,
            flags,
            num_variables,
            num_points,
            num_values,
        })
    }

    fn is_complex(&self) -> bool {
        is_complex(self.flags)
    }
}

fn is_complex(flags: &str) -> bool {
    flags.to_lowercase().contains("complex")
}

fn is_newline(c: u8) -> bool {
    c == b'\n' || c == b'\r'
}

fn is_space_or_line(c: u8) -> bool {
    c == b'\n' || c == b'\r' || c == b' ' || c == b'\t'
}

fn utf8(input: &[u8]) -> std::result::Result<&str, str::Utf8Error> {
    str::from_utf8(input)
}

fn header_field(input: &[u8]) -> Res<(&str, &str)> {
    let key = verify(
        map_res(take_till1(|c: u8| c == b':' || is_newline(c)), utf8),
        |k: &str| !matches!(k.trim(), "Variables" | "Values" | "Binary"),
    );
    let (input, (key, _, _, value, _)) = tuple((
        key,
        char(':'),
        space0,
        map_res(take_till(is_newline), utf8),
        line_ending,
    ))(input)?;
    Ok((input, (key.trim(), value.trim())))
}

fn variable(input: &[u8]) -> Res<Variable> {
    let (input, (_, idx, _, name, _, unit, _, _)) = tuple((
        space0,
        map_res(map_res(digit1, utf8), |s: &str| s.parse::<usize>()),
        space1,
        map_res(take_till1(is_space_or_line), utf8),
        space1,
        map_res(take_till1(is_space_or_line), utf8),
        take_till(is_newline),
        line_ending,
    ))(input)?;
    Ok((input, Variable { idx, name, unit }))
}

fn variables(input: &[u8], n: usize) -> Res<Vec<Variable>> {
    let (input, _) = tuple((tag("Variables:"), space0, opt(line_ending)))(input)?;
    count(variable, n)(input)
}

/// Parses the data marker, returning `true` for binary data.
fn data_marker(input: &[u8]) -> Res<bool> {
    let (input, marker) = preceded(multispace0, alt((tag("Values:"), tag("Binary:"))))(input)?;
    let (input, _) = pair(space0, line_ending)(input)?;
    Ok((input, marker == b"Binary:"))
}

fn binary_data<'a>(input: &'a [u8], header: &Header<'_>) -> Res<'a, Data> {
    let nvars = header.num_variables;
    let (input, values) = count(le_f64, header.num_values)(input)?;

    let data = if header.is_complex() {
        let mut signals = vec![
            ComplexSignal {
                real: Vec::with_capacity(header.num_points),
                imag: Vec::with_capacity(header.num_points),
            };
            nvars
        ];
        for point in values.chunks_exact(2 * nvars) {
            for (sig, pair) in signals.iter_mut().zip(point.chunks_exact(2)) {
                sig.real.push(pair[0]);
                sig.imag.push(pair[1]);
            }
        }
        Data::Complex(signals)
    } else {
        let mut signals = vec![Vec::with_capacity(header.num_points); nvars];
        for point in values.chunks_exact(nvars) {
            for (sig, value) in signals.iter_mut().zip(point) {
                sig.push(*value);
            }
        }
        Data::Real(signals)
    };

    Ok((input, data))
}

fn ascii_value<'a>(input: &'a [u8], complex: bool) -> Res<'a, (f64, f64)> {
    if complex {
        separated_pair(double, char(','), double)(input)
    } else {
        map(double, |x: f64| (x, 0.0))(input)
    }
}

fn ascii_point<'a>(input: &'a [u8], nvars: usize, complex: bool) -> Res<'a, Vec<(f64, f64)>> {
    let (input, _) = tuple((multispace0, digit1, space1))(input)?;
    let (input, first) = ascii_value(input, complex)?;
    let (input, rest) = count(
        preceded(multispace1, |i: &'a [u8]| ascii_value(i, complex)),
        nvars - 1,
    )(input)?;

    let mut point = Vec::with_capacity(nvars);
    point.push(first);
    point.extend(rest);
    Ok((input, point))
}

fn ascii_data<'a>(input: &'a [u8], header: &Header<'_>) -> Res<'a, Data> {
    let nvars = header.num_variables;
    let complex = header.is_complex();
    let (input, points) = count(
        |i: &'a [u8]| ascii_point(i, nvars, complex),
        header.num_points,
    )(input)?;

    let data = if complex {
        let mut signals = vec![
            ComplexSignal {
                real: Vec::with_capacity(header.num_points),
                imag: Vec::with_capacity(header.num_points),
            };
            nvars
        ];
        for point in points {
            for (sig, (re, im)) in signals.iter_mut().zip(point) {
                sig.real.push(re);
                sig.imag.push(im);
            }
        }
        Data::Complex(signals)
    } else {
        let mut signals = vec![Vec::with_capacity(header.num_points); nvars];
        for point in points {
            for (sig, (re, _)) in signals.iter_mut().zip(point) {
                sig.push(re);
            }
        }
        Data::Real(signals)
    };

    Ok((input, data))
}

fn analysis<'a>(full: &'a [u8], input: &'a [u8]) -> Result<(&'a [u8], Analysis<'a>)> {
    let err = |e: nom::Err<nom::error::Error<&'a [u8]>>| nom_error(full, e);

    let (input, fields) = many1(header_field)(input).map_err(err)?;
    let header = Header::from_fields(&fields)?;
    let (input, variables) = variables(input, header.num_variables).map_err(err)?;
    let (input, binary) = data_marker(input).map_err(err)?;
    let (input, data) = if binary {
        binary_data(input, &header)
    } else {
        ascii_data(input, &header)
    }
    .map_err(err)?;

    Ok((
        input,
        Analysis {
            title: header.title,
            date: header.date,
            plotname: header.plotname,
            flags: header.flags,
            num_variables: header.num_variables,
            num_points: header.num_points,
            variables,
            data,
        },
    ))
}

fn nom_error(full: &[u8], err: nom::Err<nom::error::Error<&[u8]>>) -> Error {
    let offset = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => full.len() - e.input.len(),
        nom::Err::Incomplete(_) => full.len(),
    };
    Error::Parse { offset }
}

pub(crate) fn parse_rawfile(input: &[u8]) -> Result<Vec<Analysis<'_>>> {
    let mut analyses = Vec::new();
    let mut rest = input;
    loop {
        let (next, _) = multispace0::<_, nom::error::Error<&[u8]>>(rest)
            .map_err(|e| nom_error(input, e))?;
        if next.is_empty() {
            break;
        }
        let (next, analysis) = analysis(input, next)?;
        analyses.push(analysis);
        rest = next;
    }

    if analyses.is_empty() {
        return Err(Error::Empty);
    }
    Ok(analyses)
}
