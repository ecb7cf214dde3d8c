use heck::ToUpperCamelCase;

/// Turns a configuration key such as `frameOptions` into a template parameter key (`FrameOptions`).
pub fn to_parameter_key(s: &str) -> String {
    s.to_upper_camel_case()
}
