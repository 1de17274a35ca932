use tracing::{debug, warn};

use super::hub::HubConverter;
use crate::codecs::{MgrsCodec, OpenLocationCode, PlusCodeCodec, UtmUpsMgrs};
use crate::config::Settings;
use crate::error::{ConversionError, Result};
use crate::models::{ConversionRequest, Format};
use crate::utils::constants::HELP;

/// The path a conversion takes through the decimal degree hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Source and destination match; the input is returned untouched.
    Identity,
    /// Decimal degrees to another format.
    FromHub(Format),
    /// Another format to decimal degrees.
    ToHub(Format),
    /// Source to decimal degrees, then decimal degrees to destination.
    ViaHub(Format, Format),
}

impl Route {
    pub fn plan(source: Format, destination: Format) -> Self {
        match (source, destination) {
            (source, destination) if source == destination => Route::Identity,
            (Format::Dd, destination) => Route::FromHub(destination),
            (source, Format::Dd) => Route::ToHub(source),
            (source, destination) => Route::ViaHub(source, destination),
        }
    }

    /// Number of hub-relative steps taken.
    pub fn hops(&self) -> usize {
        match self {
            Route::Identity => 0,
            Route::FromHub(_) | Route::ToHub(_) => 1,
            Route::ViaHub(_, _) => 2,
        }
    }
}

/// Converts coordinate text between any two supported formats.
///
/// Stateless apart from its codecs and options, so one instance can serve
/// many threads at once.
pub struct Converter {
    hub: HubConverter,
}

impl Converter {
    pub fn new() -> Self {
        Self {
            hub: HubConverter::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.check()?;

        let mgrs = UtmUpsMgrs::new(settings.mgrs_precision)?;
        let pluscode = OpenLocationCode::new(settings.pluscode_length)?;
        debug!(
            mgrs_precision = mgrs.precision(),
            pluscode_length = pluscode.code_length(),
            strict_hemisphere = settings.strict_hemisphere,
            "codecs configured"
        );

        let hub = HubConverter::new(Box::new(mgrs), Box::new(pluscode))
            .with_strict_hemisphere(settings.strict_hemisphere);

        Ok(Self { hub })
    }

    pub fn with_mgrs_codec(mut self, codec: impl MgrsCodec + 'static) -> Self {
        self.hub = self.hub.with_mgrs_codec(Box::new(codec));
        self
    }

    pub fn with_pluscode_codec(mut self, codec: impl PlusCodeCodec + 'static) -> Self {
        self.hub = self.hub.with_pluscode_codec(Box::new(codec));
        self
    }

    pub fn with_strict_hemisphere(mut self, strict_hemisphere: bool) -> Self {
        self.hub = self.hub.with_strict_hemisphere(strict_hemisphere);
        self
    }

    /// Convert `coordinates` from `source` to `destination`.
    ///
    /// Identity conversions return the input as given without touching any
    /// codec. Everything else goes through decimal degrees.
    pub fn convert(
        &self,
        coordinates: &str,
        source: Format,
        destination: Format,
    ) -> Result<String> {
        debug!(%source, %destination, "validating");
        if coordinates.trim().is_empty() {
            return Err(ConversionError::malformed(source, "no coordinates given"));
        }

        let route = Route::plan(source, destination);
        debug!(?route, hops = route.hops(), "converting");

        let result = match route {
            Route::Identity => Ok(coordinates.to_string()),
            _ => self
                .hub
                .to_hub(coordinates, source)
                .and_then(|coordinate| self.hub.from_hub(&coordinate, destination)),
        };

        match &result {
            Ok(converted) => debug!(%converted, "succeeded"),
            Err(e) => warn!(error = %e, %source, %destination, "conversion failed"),
        }
        result
    }

    /// Like [`Converter::convert`], with the formats given by name. Unknown
    /// names are rejected before any parsing, input side first.
    pub fn convert_tags(&self, coordinates: &str, from: &str, to: &str) -> Result<String> {
        let request = ConversionRequest::from_tags(coordinates, from, to)?;
        self.convert_request(&request)
    }

    pub fn convert_request(&self, request: &ConversionRequest) -> Result<String> {
        self.convert(&request.coordinates, request.from, request.to)
    }

    /// Handle a raw JSON request body. An empty body yields the help text.
    pub fn handle_request(&self, body: &str) -> Result<String> {
        if body.trim().is_empty() {
            return Ok(HELP.to_string());
        }

        let request = ConversionRequest::from_json(body)?;
        self.convert_request(&request)
    }

    /// [`Converter::handle_request`] collapsed into a single string: the
    /// converted coordinates or the error message.
    pub fn respond(&self, body: &str) -> String {
        match self.handle_request(body) {
            Ok(response) => response,
            Err(e) => e.to_string(),
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::CodeArea;
    use crate::models::Side;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Codec double that counts calls and always fails.
    #[derive(Clone, Default)]
    struct CountingCodec {
        calls: Arc<AtomicUsize>,
    }

    impl CountingCodec {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn hit(&self) -> ConversionError {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ConversionError::codec("counting", "called")
        }
    }

    impl MgrsCodec for CountingCodec {
        fn to_mgrs(&self, _latitude: f64, _longitude: f64) -> Result<String> {
            Err(self.hit())
        }

        fn to_lat_lon(&self, _gridref: &str) -> Result<(f64, f64)> {
            Err(self.hit())
        }
    }

    impl PlusCodeCodec for CountingCodec {
        fn encode(&self, _latitude: f64, _longitude: f64) -> Result<String> {
            Err(self.hit())
        }

        fn decode(&self, _code: &str) -> Result<CodeArea> {
            Err(self.hit())
        }
    }

    #[test]
    fn test_route_plan() {
        assert_eq!(Route::plan(Format::Dms, Format::Dms), Route::Identity);
        assert_eq!(Route::plan(Format::Dd, Format::Mgrs), Route::FromHub(Format::Mgrs));
        assert_eq!(Route::plan(Format::PlusCode, Format::Dd), Route::ToHub(Format::PlusCode));
        assert_eq!(
            Route::plan(Format::Mgrs, Format::PlusCode),
            Route::ViaHub(Format::Mgrs, Format::PlusCode)
        );

        for source in Format::ALL {
            for destination in Format::ALL {
                assert!(Route::plan(source, destination).hops() <= 2);
            }
        }
    }

    #[test]
    fn test_identity_never_touches_codecs() {
        let mgrs = CountingCodec::default();
        let pluscode = CountingCodec::default();
        let converter = Converter::new()
            .with_mgrs_codec(mgrs.clone())
            .with_pluscode_codec(pluscode.clone());

        let inputs = [
            (Format::Dms, "48°53'10.18\"N 2°20'35.09\"E"),
            (Format::Dd, "-48.8866111111 -2.34330555556"),
            (Format::Mgrs, "15TWG0000049776"),
            (Format::PlusCode, "8FVC9G8F+6X"),
        ];
        for (format, text) in inputs {
            assert_eq!(converter.convert(text, format, format).unwrap(), text);
        }

        assert_eq!(mgrs.calls(), 0);
        assert_eq!(pluscode.calls(), 0);
    }

    #[test]
    fn test_dms_identity_keeps_precision() {
        let converter = Converter::new();
        let text = "48°53'10.18345\"N 2°20'35.09\"E";
        assert_eq!(converter.convert(text, Format::Dms, Format::Dms).unwrap(), text);
    }

    #[test]
    fn test_cross_format_goes_through_both_codecs() {
        let mgrs = CountingCodec::default();
        let pluscode = CountingCodec::default();
        let converter = Converter::new()
            .with_mgrs_codec(mgrs.clone())
            .with_pluscode_codec(pluscode.clone());

        let err = converter
            .convert("15TWG0000049776", Format::Mgrs, Format::PlusCode)
            .unwrap_err();
        assert!(matches!(err, ConversionError::CodecFailure { codec: "counting", .. }));
        // The first failure stops the conversion.
        assert_eq!(mgrs.calls(), 1);
        assert_eq!(pluscode.calls(), 0);
    }

    #[test]
    fn test_unknown_formats() {
        let converter = Converter::new();

        match converter.convert_tags("48° 48°", "barf", "dd") {
            Err(ConversionError::UnsupportedFormat { side, name }) => {
                assert_eq!(side, Side::Input);
                assert_eq!(name, "barf");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        match converter.convert_tags("48° 48°", "dms", "barf") {
            Err(ConversionError::UnsupportedFormat { side, .. }) => assert_eq!(side, Side::Output),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_coordinates_rejected() {
        let converter = Converter::new();
        for format in Format::ALL {
            assert!(matches!(
                converter.convert("  ", format, format),
                Err(ConversionError::MalformedInput { .. })
            ));
        }
    }

    #[test]
    fn test_dms_to_dd() {
        let converter = Converter::new();
        let dd = converter
            .convert("48°53'10.18\"N 2°20'35.09\"E", Format::Dms, Format::Dd)
            .unwrap();
        let parts: Vec<f64> = dd.split(' ').map(|p| p.parse().unwrap()).collect();
        assert!((parts[0] - 48.886161).abs() < 1e-6);
        assert!((parts[1] - 2.343081).abs() < 1e-6);
    }

    #[test]
    fn test_dd_to_dms() {
        let converter = Converter::new();
        assert_eq!(
            converter
                .convert("-48.8866111111 -2.34330555556", Format::Dd, Format::Dms)
                .unwrap(),
            "48° 53' 11.8\" S 2° 20' 35.9\" W"
        );
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings::default()
            .with_pluscode_length(11)
            .with_mgrs_precision(3)
            .with_strict_hemisphere(true);
        let converter = Converter::from_settings(&settings).unwrap();

        assert_eq!(
            converter
                .convert("48.886161111111 2.343080555556", Format::Dd, Format::PlusCode)
                .unwrap(),
            "8FW4V8PV+F68"
        );
        assert_eq!(
            converter
                .convert("51.5074 -0.1278", Format::Dd, Format::Mgrs)
                .unwrap(),
            "30UXC993101"
        );
        let unsigned = "48°53'10\" 2°20'35\"";
        assert!(converter.convert(unsigned, Format::Dms, Format::Dd).is_err());
        assert!(Converter::new().convert(unsigned, Format::Dms, Format::Dd).is_ok());

        assert!(Converter::from_settings(&Settings::default().with_pluscode_length(9)).is_err());
    }

    #[test]
    fn test_handle_request() {
        let converter = Converter::new();

        assert_eq!(converter.handle_request("").unwrap(), HELP);
        assert_eq!(
            converter
                .handle_request(r#"{"coordinates": "8FVC9G8F+6X", "from": "pluscode", "to": "dd"}"#)
                .unwrap(),
            "47.3655625 8.5249375"
        );
        assert!(matches!(
            converter.handle_request("{"),
            Err(ConversionError::Json(_))
        ));
        assert!(matches!(
            converter.handle_request(r#"{"coordinates": "", "from": ""}"#),
            Err(ConversionError::MissingField("to"))
        ));
    }

    #[test]
    fn test_respond_flattens_errors() {
        let converter = Converter::new();
        assert_eq!(
            converter.respond(r#"{"coordinates": "x", "from": "barf", "to": "dd"}"#),
            "I don't support that input coordinate type: 'barf'"
        );
        assert_eq!(
            converter.respond(
                r#"{"coordinates": "15TWG0000049776", "from": "mgrs", "to": "mgrs"}"#
            ),
            "15TWG0000049776"
        );
    }
}
