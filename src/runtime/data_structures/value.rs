use std::{ cmp::Ordering,
           fmt::{ self, Display, Formatter } };
use crate::lang::tokenizing::NumberType;



/// Trait for converting Rust values into Forth values for pushing onto the stacks.
pub trait ToValue
{
    /// Implement to handle the actual conversion.
    fn to_value(&self) -> Value;
}


impl ToValue for i64
{
    fn to_value(&self) -> Value
    {
        Value::Int(*self)
    }
}


impl ToValue for i32
{
    fn to_value(&self) -> Value
    {
        Value::Int(*self as i64)
    }
}


impl ToValue for usize
{
    fn to_value(&self) -> Value
    {
        Value::Int(*self as i64)
    }
}


impl ToValue for f64
{
    fn to_value(&self) -> Value
    {
        Value::Float(*self)
    }
}


/// Booleans become the traditional Forth flags, -1 for true and 0 for false.
impl ToValue for bool
{
    fn to_value(&self) -> Value
    {
        Value::Int(if *self { -1 } else { 0 })
    }
}


impl ToValue for &str
{
    fn to_value(&self) -> Value
    {
        Value::String(self.to_string())
    }
}


impl ToValue for String
{
    fn to_value(&self) -> Value
    {
        Value::String(self.clone())
    }
}


impl ToValue for &String
{
    fn to_value(&self) -> Value
    {
        Value::String((*self).clone())
    }
}


impl ToValue for NumberType
{
    fn to_value(&self) -> Value
    {
        match self
        {
            NumberType::Int(value)   => Value::Int(*value),
            NumberType::Float(value) => Value::Float(*value)
        }
    }
}


impl ToValue for Value
{
    fn to_value(&self) -> Value
    {
        self.clone()
    }
}



/// The values that can live on the data and return stacks.  Values of different kinds can be
/// freely mixed on the stacks, words that need a particular kind check for it when they run.
#[derive(Clone, Debug)]
pub enum Value
{
    Int(i64),
    Float(f64),
    String(String)
}


/// Integers and floats compare numerically with each other.  Strings only ever equal other strings.
impl PartialEq for Value
{
    fn eq(&self, other: &Self) -> bool
    {
        match ( self, other )
        {
            ( Value::Int(a),    Value::Int(b) )    => a == b,
            ( Value::Float(a),  Value::Float(b) )  => a == b,
            ( Value::Int(a),    Value::Float(b) )  => (*a as f64) == *b,
            ( Value::Float(a),  Value::Int(b) )    => *a == (*b as f64),
            ( Value::String(a), Value::String(b) ) => a == b,
            _                                      => false
        }
    }
}


/// Numbers order numerically and strings lexicographically.  Mixing the two has no ordering.
impl PartialOrd for Value
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering>
    {
        match ( self, other )
        {
            ( Value::Int(a),    Value::Int(b) )    => a.partial_cmp(b),
            ( Value::Float(a),  Value::Float(b) )  => a.partial_cmp(b),
            ( Value::Int(a),    Value::Float(b) )  => (*a as f64).partial_cmp(b),
            ( Value::Float(a),  Value::Int(b) )    => a.partial_cmp(&(*b as f64)),
            ( Value::String(a), Value::String(b) ) => a.partial_cmp(b),
            _                                      => None
        }
    }
}


/// Floats always print with a fractional part so that they read back in as floats.
impl Display for Value
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match self
        {
            Value::Int(value)    => write!(f, "{}", value),
            Value::Float(value)  => write!(f, "{}", format_float(*value)),
            Value::String(value) => write!(f, "{}", value)
        }
    }
}


fn format_float(value: f64) -> String
{
    let text = value.to_string();

    if value.is_finite() && !text.contains('.')
    {
        format!("{}.0", text)
    }
    else
    {
        text
    }
}


impl Value
{
    /// Build a flag value from a boolean.
    pub fn from_flag(flag: bool) -> Value
    {
        flag.to_value()
    }

    /// The name of the value's kind as used in type mismatch messages.
    pub fn type_name(&self) -> &'static str
    {
        match self
        {
            Value::Int(_)    => "integer",
            Value::Float(_)  => "float",
            Value::String(_) => "string"
        }
    }

    pub fn is_numeric(&self) -> bool
    {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn is_string(&self) -> bool
    {
        matches!(self, Value::String(_))
    }

    /// Interpret the value as a flag.  Zero, integer or float, is false and anything else numeric
    /// is true.  Strings are not flags.
    pub fn as_flag(&self) -> Option<bool>
    {
        match self
        {
            Value::Int(value)   => Some(*value != 0),
            Value::Float(value) => Some(*value != 0.0),
            Value::String(_)    => None
        }
    }

    /// The stack effect reported to observers when this value is pushed as a literal.
    pub fn literal_effect(&self) -> &'static str
    {
        match self
        {
            Value::String(_) => "( -- str )",
            _                => "( -- n )"
        }
    }

    /// Render the value as Forth source that pushes it again.
    pub fn to_source(&self) -> String
    {
        match self
        {
            Value::String(text) => format!("S\" {}\"", text),
            _                   => self.to_string()
        }
    }
}
