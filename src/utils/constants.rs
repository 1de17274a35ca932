/// Configuration sources
pub const DEFAULT_CONFIG_FILE: &str = "coordinate-converter.toml";
pub const ENV_PREFIX: &str = "COORDCONV";

/// Open Location Code defaults
pub const DEFAULT_PLUSCODE_LENGTH: usize = 10;
pub const MIN_PLUSCODE_LENGTH: usize = 2;
pub const MAX_PLUSCODE_LENGTH: usize = 15;

/// MGRS digits per axis (5 = 1 m resolution)
pub const DEFAULT_MGRS_PRECISION: u8 = 5;
pub const MAX_MGRS_PRECISION: u8 = 5;

/// Help text returned for an empty request
pub const HELP: &str = r#"
This is a microservice which turns one set of map coordinates into another.

Takes as its input a JSON document of the form:
    {
        "coordinates": "<the coordinates to convert>",
        "from": "<type of the coordinates to convert>",
        "to": "<type to convert the coordinates to>"
    }

Supported coordinate types:
* degrees/minutes/seconds (dms)
** 48°53'10.18"N 2°20'35.09"E
* decimal degrees (dd)
** -48.8866111111 -2.34330555556
* open location code (openlocationcode, pluscode)
** 8FVC9G8F+6X
* Military Grid Reference System (mgrs)
** 4QFJ1234567890

If you supply the wrong kind of coordinates for the type given, you will get bad results.
"#;
