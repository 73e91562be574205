//! Schema registry
//!
//! Static description of every setting the controller exposes. Settings are
//! organized into groups (`sys`, motors `1`..`4`, axes `x`..`c`, the spindle
//! `p1`, and the offset/home groups); groups of the same kind share one
//! schema.
//!
//! The order of `GROUP_MAPPING` is the request order and the display order.
//! It also breaks ties when resolving flat text keys such as `g54x`.

use crate::value::ConfigValue;

/// How the numeric part of a setting is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// Whole number (`{:d}`)
    Integer,
    /// Fixed number of decimals (`{:.Nf}`)
    Fixed(usize),
    /// Value as-is (`{}`)
    Plain,
}

/// Display template of a field: a value rendering followed by a units suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFormat {
    /// Rendering of the value
    pub value: ValueFormat,
    /// Text printed after the value, e.g. `mm/min` or `[0=NO,1=NC]`
    pub units: &'static str,
}

impl DisplayFormat {
    /// Render `value` followed by this format's units
    pub fn render(&self, value: &ConfigValue) -> String {
        self.render_with_units(value, self.units)
    }

    /// Render `value` followed by `units` instead of the schema's suffix
    pub fn render_with_units(&self, value: &ConfigValue, units: &str) -> String {
        let rendered = match (self.value, value) {
            (ValueFormat::Integer, v) => match v.as_whole() {
                Some(int) => int.to_string(),
                None => v.to_string(),
            },
            (ValueFormat::Fixed(precision), v) => match v.as_f64() {
                Some(float) => format!("{:.*}", precision, float),
                None => v.to_string(),
            },
            (ValueFormat::Plain, v) => v.to_string(),
        };

        if units.is_empty() {
            rendered
        } else {
            format!("{} {}", rendered, units)
        }
    }
}

/// One setting within a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Key within the group, e.g. `vm`
    pub key: &'static str,
    /// Human readable description as printed by `$$`
    pub description: &'static str,
    /// How the value is printed
    pub format: DisplayFormat,
}

/// Identifier of a shared schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaId {
    /// System-wide settings (`sys`)
    System,
    /// Motor settings (`1`..`4`)
    Motor,
    /// Linear axis settings (`x`, `y`, `z`)
    LinearAxis,
    /// Rotary axis settings (`a`, `b`, `c`)
    RotaryAxis,
    /// Spindle PWM settings (`p1`)
    SpindlePwm,
    /// Coordinate system offsets (`g54`..`g59`, `g92`)
    CoordinateOffset,
    /// Stored home positions (`g28`, `g30`)
    HomePosition,
}

impl SchemaId {
    /// Description prefix printed before every field of `group_id`
    pub fn description_prefix(&self, group_id: &str) -> Option<String> {
        match self {
            SchemaId::Motor => Some(format!("m{}", group_id)),
            SchemaId::LinearAxis
            | SchemaId::RotaryAxis
            | SchemaId::CoordinateOffset
            | SchemaId::HomePosition => Some(group_id.to_string()),
            SchemaId::System | SchemaId::SpindlePwm => None,
        }
    }
}

/// An ordered set of field definitions
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    /// Which schema this is
    pub id: SchemaId,
    /// Fields in display order
    pub fields: &'static [FieldDef],
}

impl Schema {
    /// Look up a field by key
    pub fn field(&self, key: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// True if `key` is defined by this schema
    pub fn contains(&self, key: &str) -> bool {
        self.field(key).is_some()
    }
}

const fn int(units: &'static str) -> DisplayFormat {
    DisplayFormat {
        value: ValueFormat::Integer,
        units,
    }
}

const fn fixed(precision: usize, units: &'static str) -> DisplayFormat {
    DisplayFormat {
        value: ValueFormat::Fixed(precision),
        units,
    }
}

const fn plain() -> DisplayFormat {
    DisplayFormat {
        value: ValueFormat::Plain,
        units: "",
    }
}

const fn field(key: &'static str, description: &'static str, format: DisplayFormat) -> FieldDef {
    FieldDef {
        key,
        description,
        format,
    }
}

const SWITCH_MODES: &str = "[0=off,1=homing,2=limit,3=limit+homing]";

static SYSTEM_FIELDS: [FieldDef; 27] = [
    field("fb", "firmware build", fixed(2, "")),
    field("fv", "firmware version", fixed(2, "")),
    field("hp", "hardware platform", fixed(2, "")),
    field("hv", "hardware version", fixed(2, "")),
    field("id", "TinyG ID", plain()),
    field("ja", "junction acceleration", int("mm")),
    field("ct", "chordal tolerance", fixed(4, "mm")),
    field("sl", "soft limit enable", int("")),
    field("st", "switch type", int("[0=NO,1=NC]")),
    field("mt", "motor idle timeout", fixed(2, "Sec")),
    field("ej", "enable json mode", int("[0=text,1=JSON]")),
    field(
        "jv",
        "json verbosity",
        int("[0=silent,1=footer,2=messages,3=configs,4=linenum,5=verbose]"),
    ),
    field("js", "json serialize style", int("[0=relaxed,1=strict]")),
    field("tv", "text verbosity", int("[0=silent,1=verbose]")),
    field("qv", "queue report verbosity", int("[0=off,1=single,2=triple]")),
    field("sv", "status report verbosity", int("[0=off,1=filtered,2=verbose]")),
    field("si", "status interval", int("ms")),
    field("ec", "expand LF to CRLF on TX", int("[0=off,1=on]")),
    field("ee", "enable echo", int("[0=off,1=on]")),
    field("ex", "enable flow control", int("[0=off,1=XON/XOFF, 2=RTS/CTS]")),
    field(
        "baud",
        "USB baud rate",
        int("[1=9600,2=19200,3=38400,4=57600,5=115200,6=230400]"),
    ),
    field("net", "network mode", int("[0=master]")),
    field("gpl", "default gcode plane", int("[0=G17,1=G18,2=G19]")),
    field("gun", "default gcode units mode", int("[0=G20,1=G21]")),
    field("gco", "default gcode coord system", int("[1-6 (G54-G59)]")),
    field("gpa", "default gcode path control", int("[0=G61,1=G61.1,2=G64]")),
    field("gdi", "default gcode distance mode", int("[0=G90,1=G91]")),
];

static MOTOR_FIELDS: [FieldDef; 6] = [
    field("ma", "map to axis", int("[0=X,1=Y,2=Z...]")),
    field("sa", "step angle", fixed(3, "deg")),
    field("tr", "travel per revolution", fixed(4, "mm")),
    field("mi", "microsteps", int("[1,2,4,8]")),
    field("po", "polarity", int("[0=normal,1=reverse]")),
    field(
        "pm",
        "power management",
        int("[0=disabled,1=always on,2=in cycle,3=when moving]"),
    ),
];

static LINEAR_AXIS_FIELDS: [FieldDef; 14] = [
    field("am", "axis mode", int("[standard]")),
    field("vm", "velocity maximum", int("mm/min")),
    field("fr", "feedrate maximum", int("mm/min")),
    field("tn", "travel minimum", fixed(3, "mm")),
    field("tm", "travel maximum", fixed(3, "mm")),
    field("jm", "jerk maximum", int("mm/min^3 * 1 million")),
    field("jh", "jerk homing", int("mm/min^3 * 1 million")),
    field("jd", "junction deviation", fixed(4, "mm (larger is faster)")),
    field("sn", "switch min", int(SWITCH_MODES)),
    field("sx", "switch max", int(SWITCH_MODES)),
    field("sv", "search velocity", int("mm/min")),
    field("lv", "latch velocity", int("mm/min")),
    field("lb", "latch backoff", fixed(3, "mm")),
    field("zb", "zero backoff", fixed(3, "mm")),
];

static ROTARY_AXIS_FIELDS: [FieldDef; 15] = [
    field("am", "axis mode", int("[radius]")),
    field("vm", "velocity maximum", int("deg/min")),
    field("fr", "feedrate maximum", int("deg/min")),
    field("tn", "travel minimum", fixed(3, "deg")),
    field("tm", "travel maximum", fixed(3, "deg")),
    field("jm", "jerk maximum", int("deg/min^3 * 1 million")),
    field("jh", "jerk homing", int("deg/min^3 * 1 million")),
    field("jd", "junction deviation", fixed(4, "deg (larger is faster)")),
    field("ra", "radius value", fixed(4, "deg")),
    field("sn", "switch min", int(SWITCH_MODES)),
    field("sx", "switch max", int(SWITCH_MODES)),
    field("sv", "search velocity", int("deg/min")),
    field("lv", "latch velocity", int("deg/min")),
    field("lb", "latch backoff", fixed(3, "deg")),
    field("zb", "zero backoff", fixed(3, "deg")),
];

static SPINDLE_PWM_FIELDS: [FieldDef; 10] = [
    field("frq", "pwm frequency", int("Hz")),
    field("csl", "pwm cw speed lo", int("RPM")),
    field("csh", "pwm cw speed hi", int("RPM")),
    field("cpl", "pwm cw phase lo", fixed(3, "[0..1]")),
    field("cph", "pwm cw phase hi", fixed(3, "[0..1]")),
    field("wsl", "pwm ccw speed lo", int("RPM")),
    field("wsh", "pwm ccw speed hi", int("RPM")),
    field("wpl", "pwm ccw phase lo", fixed(3, "[0..1]")),
    field("wph", "pwm ccw phase hi", fixed(3, "[0..1]")),
    field("pof", "pwm phase off", fixed(3, "[0..1]")),
];

static COORDINATE_OFFSET_FIELDS: [FieldDef; 6] = [
    field("x", "x offset", fixed(3, "mm")),
    field("y", "y offset", fixed(3, "mm")),
    field("z", "z offset", fixed(3, "mm")),
    field("a", "a offset", fixed(3, "deg")),
    field("b", "b offset", fixed(3, "deg")),
    field("c", "c offset", fixed(3, "deg")),
];

static HOME_POSITION_FIELDS: [FieldDef; 6] = [
    field("x", "x position", fixed(3, "mm")),
    field("y", "y position", fixed(3, "mm")),
    field("z", "z position", fixed(3, "mm")),
    field("a", "a position", fixed(3, "deg")),
    field("b", "b position", fixed(3, "deg")),
    field("c", "c position", fixed(3, "deg")),
];

static SYSTEM: Schema = Schema {
    id: SchemaId::System,
    fields: &SYSTEM_FIELDS,
};
static MOTOR: Schema = Schema {
    id: SchemaId::Motor,
    fields: &MOTOR_FIELDS,
};
static LINEAR_AXIS: Schema = Schema {
    id: SchemaId::LinearAxis,
    fields: &LINEAR_AXIS_FIELDS,
};
static ROTARY_AXIS: Schema = Schema {
    id: SchemaId::RotaryAxis,
    fields: &ROTARY_AXIS_FIELDS,
};
static SPINDLE_PWM: Schema = Schema {
    id: SchemaId::SpindlePwm,
    fields: &SPINDLE_PWM_FIELDS,
};
static COORDINATE_OFFSET: Schema = Schema {
    id: SchemaId::CoordinateOffset,
    fields: &COORDINATE_OFFSET_FIELDS,
};
static HOME_POSITION: Schema = Schema {
    id: SchemaId::HomePosition,
    fields: &HOME_POSITION_FIELDS,
};

/// Look up the schema definition for a schema id
pub fn schema(id: SchemaId) -> &'static Schema {
    match id {
        SchemaId::System => &SYSTEM,
        SchemaId::Motor => &MOTOR,
        SchemaId::LinearAxis => &LINEAR_AXIS,
        SchemaId::RotaryAxis => &ROTARY_AXIS,
        SchemaId::SpindlePwm => &SPINDLE_PWM,
        SchemaId::CoordinateOffset => &COORDINATE_OFFSET,
        SchemaId::HomePosition => &HOME_POSITION,
    }
}

/// Group id of the system settings
pub const SYSTEM_GROUP: &str = "sys";

/// Every group in request and display order.
///
/// Do not sort: flat key resolution walks this list front to back.
pub static GROUP_MAPPING: &[(&str, SchemaId)] = &[
    (SYSTEM_GROUP, SchemaId::System),
    ("1", SchemaId::Motor),
    ("2", SchemaId::Motor),
    ("3", SchemaId::Motor),
    ("4", SchemaId::Motor),
    ("x", SchemaId::LinearAxis),
    ("y", SchemaId::LinearAxis),
    ("z", SchemaId::LinearAxis),
    ("a", SchemaId::RotaryAxis),
    ("b", SchemaId::RotaryAxis),
    ("c", SchemaId::RotaryAxis),
    ("p1", SchemaId::SpindlePwm),
    ("g54", SchemaId::CoordinateOffset),
    ("g55", SchemaId::CoordinateOffset),
    ("g56", SchemaId::CoordinateOffset),
    ("g57", SchemaId::CoordinateOffset),
    ("g58", SchemaId::CoordinateOffset),
    ("g59", SchemaId::CoordinateOffset),
    ("g92", SchemaId::CoordinateOffset),
    ("g28", SchemaId::HomePosition),
    ("g30", SchemaId::HomePosition),
];

/// Keys the controller reports but does not accept as writes.
///
/// The baud rate is included because changing it mid-session would cut the
/// link.
static READ_ONLY: &[(&str, &[&str])] = &[(
    SYSTEM_GROUP,
    &["fb", "fv", "hp", "hv", "id", "baud"],
)];

/// Iterate group ids in mapping order
pub fn group_ids() -> impl Iterator<Item = &'static str> {
    GROUP_MAPPING.iter().map(|(group_id, _)| *group_id)
}

/// Schema id shared by `group_id`, if the group exists
pub fn try_schema_id_for(group_id: &str) -> Option<SchemaId> {
    GROUP_MAPPING
        .iter()
        .find(|(id, _)| *id == group_id)
        .map(|(_, schema_id)| *schema_id)
}

/// Schema of `group_id`, if the group exists
pub fn try_schema_for(group_id: &str) -> Option<&'static Schema> {
    try_schema_id_for(group_id).map(schema)
}

/// Schema of `group_id`.
///
/// # Panics
///
/// Panics if `group_id` is not in [`GROUP_MAPPING`]. The mapping is closed,
/// so an unknown id here is a bug in the caller; use [`try_schema_for`] for
/// ids that come from outside.
pub fn schema_for(group_id: &str) -> &'static Schema {
    match try_schema_for(group_id) {
        Some(schema) => schema,
        None => panic!("group '{}' is not in the group mapping", group_id),
    }
}

/// Keys of `group_id` that must never be written back
pub fn read_only_keys(group_id: &str) -> &'static [&'static str] {
    READ_ONLY
        .iter()
        .find(|(id, _)| *id == group_id)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

/// True if `key` is read-only in `group_id`
pub fn is_read_only(group_id: &str, key: &str) -> bool {
    read_only_keys(group_id).contains(&key)
}
