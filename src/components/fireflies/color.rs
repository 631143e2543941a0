//! Marker colors and the palettes used by the site themes.

use rand::Rng;

/// CSS named colors, sorted by name for binary search.
const NAMED: &[(&str, [u8; 3])] = &[
	("aliceblue", [240, 248, 255]),
	("antiquewhite", [250, 235, 215]),
	("aqua", [0, 255, 255]),
	("aquamarine", [127, 255, 212]),
	("azure", [240, 255, 255]),
	("beige", [245, 245, 220]),
	("bisque", [255, 228, 196]),
	("black", [0, 0, 0]),
	("blanchedalmond", [255, 235, 205]),
	("blue", [0, 0, 255]),
	("blueviolet", [138, 43, 226]),
	("brown", [165, 42, 42]),
	("burlywood", [222, 184, 135]),
	("cadetblue", [95, 158, 160]),
	("chartreuse", [127, 255, 0]),
	("chocolate", [210, 105, 30]),
	("coral", [255, 127, 80]),
	("cornflowerblue", [100, 149, 237]),
	("cornsilk", [255, 248, 220]),
	("crimson", [220, 20, 60]),
	("cyan", [0, 255, 255]),
	("darkblue", [0, 0, 139]),
	("darkcyan", [0, 139, 139]),
	("darkgoldenrod", [184, 134, 11]),
	("darkgray", [169, 169, 169]),
	("darkgreen", [0, 100, 0]),
	("darkgrey", [169, 169, 169]),
	("darkkhaki", [189, 183, 107]),
	("darkmagenta", [139, 0, 139]),
	("darkolivegreen", [85, 107, 47]),
	("darkorange", [255, 140, 0]),
	("darkorchid", [153, 50, 204]),
	("darkred", [139, 0, 0]),
	("darksalmon", [233, 150, 122]),
	("darkseagreen", [143, 188, 143]),
	("darkslateblue", [72, 61, 139]),
	("darkslategray", [47, 79, 79]),
	("darkslategrey", [47, 79, 79]),
	("darkturquoise", [0, 206, 209]),
	("darkviolet", [148, 0, 211]),
	("deeppink", [255, 20, 147]),
	("deepskyblue", [0, 191, 255]),
	("dimgray", [105, 105, 105]),
	("dimgrey", [105, 105, 105]),
	("dodgerblue", [30, 144, 255]),
	("firebrick", [178, 34, 34]),
	("floralwhite", [255, 250, 240]),
	("forestgreen", [34, 139, 34]),
	("fuchsia", [255, 0, 255]),
	("gainsboro", [220, 220, 220]),
	("ghostwhite", [248, 248, 255]),
	("gold", [255, 215, 0]),
	("goldenrod", [218, 165, 32]),
	("gray", [128, 128, 128]),
	("green", [0, 128, 0]),
	("greenyellow", [173, 255, 47]),
	("grey", [128, 128, 128]),
	("honeydew", [240, 255, 240]),
	("hotpink", [255, 105, 180]),
	("indianred", [205, 92, 92]),
	("indigo", [75, 0, 130]),
	("ivory", [255, 255, 240]),
	("khaki", [240, 230, 140]),
	("lavender", [230, 230, 250]),
	("lavenderblush", [255, 240, 245]),
	("lawngreen", [124, 252, 0]),
	("lemonchiffon", [255, 250, 205]),
	("lightblue", [173, 216, 230]),
	("lightcoral", [240, 128, 128]),
	("lightcyan", [224, 255, 255]),
	("lightgoldenrodyellow", [250, 250, 210]),
	("lightgray", [211, 211, 211]),
	("lightgreen", [144, 238, 144]),
	("lightgrey", [211, 211, 211]),
	("lightpink", [255, 182, 193]),
	("lightsalmon", [255, 160, 122]),
	("lightseagreen", [32, 178, 170]),
	("lightskyblue", [135, 206, 250]),
	("lightslategray", [119, 136, 153]),
	("lightslategrey", [119, 136, 153]),
	("lightsteelblue", [176, 196, 222]),
	("lightyellow", [255, 255, 224]),
	("lime", [0, 255, 0]),
	("limegreen", [50, 205, 50]),
	("linen", [250, 240, 230]),
	("magenta", [255, 0, 255]),
	("maroon", [128, 0, 0]),
	("mediumaquamarine", [102, 205, 170]),
	("mediumblue", [0, 0, 205]),
	("mediumorchid", [186, 85, 211]),
	("mediumpurple", [147, 112, 219]),
	("mediumseagreen", [60, 179, 113]),
	("mediumslateblue", [123, 104, 238]),
	("mediumspringgreen", [0, 250, 154]),
	("mediumturquoise", [72, 209, 204]),
	("mediumvioletred", [199, 21, 133]),
	("midnightblue", [25, 25, 112]),
	("mintcream", [245, 255, 250]),
	("mistyrose", [255, 228, 225]),
	("moccasin", [255, 228, 181]),
	("navajowhite", [255, 222, 173]),
	("navy", [0, 0, 128]),
	("oldlace", [253, 245, 230]),
	("olive", [128, 128, 0]),
	("olivedrab", [107, 142, 35]),
	("orange", [255, 165, 0]),
	("orangered", [255, 69, 0]),
	("orchid", [218, 112, 214]),
	("palegoldenrod", [238, 232, 170]),
	("palegreen", [152, 251, 152]),
	("paleturquoise", [175, 238, 238]),
	("palevioletred", [219, 112, 147]),
	("papayawhip", [255, 239, 213]),
	("peachpuff", [255, 218, 185]),
	("peru", [205, 133, 63]),
	("pink", [255, 192, 203]),
	("plum", [221, 160, 221]),
	("powderblue", [176, 224, 230]),
	("purple", [128, 0, 128]),
	("rebeccapurple", [102, 51, 153]),
	("red", [255, 0, 0]),
	("rosybrown", [188, 143, 143]),
	("royalblue", [65, 105, 225]),
	("saddlebrown", [139, 69, 19]),
	("salmon", [250, 128, 114]),
	("sandybrown", [244, 164, 96]),
	("seagreen", [46, 139, 87]),
	("seashell", [255, 245, 238]),
	("sienna", [160, 82, 45]),
	("silver", [192, 192, 192]),
	("skyblue", [135, 206, 235]),
	("slateblue", [106, 90, 205]),
	("slategray", [112, 128, 144]),
	("slategrey", [112, 128, 144]),
	("snow", [255, 250, 250]),
	("springgreen", [0, 255, 127]),
	("steelblue", [70, 130, 180]),
	("tan", [210, 180, 140]),
	("teal", [0, 128, 128]),
	("thistle", [216, 191, 216]),
	("tomato", [255, 99, 71]),
	("turquoise", [64, 224, 208]),
	("violet", [238, 130, 238]),
	("wheat", [245, 222, 179]),
	("white", [255, 255, 255]),
	("whitesmoke", [245, 245, 245]),
	("yellow", [255, 255, 0]),
	("yellowgreen", [154, 205, 50]),
];

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in `0.0..=1.0`.
	pub a: f64,
}

impl Color {
	/// An opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// A color with explicit alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// The same color with alpha replaced.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Parses a CSS color string.
	/// Supports hex (`#RGB`, `#RRGGBB`, `#RRGGBBAA`), `rgb()`/`rgba()`,
	/// `hsl()`/`hsla()`, named colors and `transparent`.
	pub fn parse(color_str: &str) -> Option<Self> {
		let s = color_str.trim();
		if let Some(hex) = s.strip_prefix('#') {
			return Self::parse_hex(hex);
		}
		if let Some(body) = function_body(s, &["rgba", "rgb"]) {
			return Self::parse_rgb(&body);
		}
		if let Some(body) = function_body(s, &["hsla", "hsl"]) {
			return Self::parse_hsl(&body);
		}
		Self::named(s)
	}

	/// Looks up a CSS color keyword, ignoring ASCII case.
	pub fn named(name: &str) -> Option<Self> {
		let name = name.to_ascii_lowercase();
		if name == "transparent" {
			return Some(Self::rgba(0, 0, 0, 0.0));
		}
		NAMED
			.binary_search_by(|(n, _)| (*n).cmp(name.as_str()))
			.ok()
			.map(|i| {
				let [r, g, b] = NAMED[i].1;
				Self::rgb(r, g, b)
			})
	}

	fn parse_rgb(parts: &[&str]) -> Option<Self> {
		let &[r, g, b, ref rest @ ..] = parts else {
			return None;
		};
		let channel = |v: &str| match v.strip_suffix('%') {
			Some(pct) => pct.parse::<f64>().ok().map(|p| (p.clamp(0.0, 100.0) * 2.55).round() as u8),
			None => v.parse::<u8>().ok(),
		};
		Some(Self::rgba(channel(r)?, channel(g)?, channel(b)?, parse_alpha(rest)?))
	}

	fn parse_hsl(parts: &[&str]) -> Option<Self> {
		let &[h, s, l, ref rest @ ..] = parts else {
			return None;
		};
		let hue = h.strip_suffix("deg").unwrap_or(h).parse::<f64>().ok()?;
		let percent = |v: &str| {
			v.strip_suffix('%')
				.unwrap_or(v)
				.parse::<f64>()
				.ok()
				.map(|p| p.clamp(0.0, 100.0) / 100.0)
		};
		let [r, g, b] = hsl_to_rgb(hue, percent(s)?, percent(l)?);
		Some(Self::rgba(r, g, b, parse_alpha(rest)?))
	}

	fn parse_hex(hex: &str) -> Option<Self> {
		if !hex.is_ascii() {
			return None;
		}
		let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
		let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);

		match hex.len() {
			3 => Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
			6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
			8 => Some(Self::rgba(
				byte(0)?,
				byte(2)?,
				byte(4)?,
				byte(6)? as f64 / 255.0,
			)),
			_ => None,
		}
	}

	/// CSS text: hex when opaque, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Opaque CSS hex, ignoring alpha.
	pub fn to_css_rgb(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}

	/// Channels normalized to `0.0..=1.0` for vertex upload.
	pub fn to_unit_rgb(self) -> [f32; 3] {
		[
			self.r as f32 / 255.0,
			self.g as f32 / 255.0,
			self.b as f32 / 255.0,
		]
	}
}

/// Arguments of `name(...)` for any of `names`, split on commas or spaces
/// with an optional `/ alpha`.
fn function_body<'a>(s: &'a str, names: &[&str]) -> Option<Vec<&'a str>> {
	let open = s.find('(')?;
	if !names.iter().any(|n| s[..open].eq_ignore_ascii_case(n)) {
		return None;
	}
	let body = s[open + 1..].strip_suffix(')')?;
	Some(
		body.split(|c: char| c == ',' || c == '/' || c.is_whitespace())
			.filter(|p| !p.is_empty())
			.collect(),
	)
}

/// Optional trailing alpha as a number or percentage, defaulting to opaque.
fn parse_alpha(rest: &[&str]) -> Option<f64> {
	let a = match rest {
		[] => return Some(1.0),
		[a] => *a,
		_ => return None,
	};
	let value = match a.strip_suffix('%') {
		Some(pct) => pct.parse::<f64>().ok()? / 100.0,
		None => a.parse::<f64>().ok()?,
	};
	(0.0..=1.0).contains(&value).then_some(value)
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
	let h = hue.rem_euclid(360.0) / 60.0;
	let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
	let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
	let (r, g, b) = match h as u32 {
		0 => (chroma, x, 0.0),
		1 => (x, chroma, 0.0),
		2 => (0.0, chroma, x),
		3 => (0.0, x, chroma),
		4 => (x, 0.0, chroma),
		_ => (chroma, 0.0, x),
	};
	let m = lightness - chroma / 2.0;
	[r, g, b].map(|c| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8)
}

/// An ordered, non-empty set of colors particles draw from.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
	/// Colors in declaration order.
	pub colors: Vec<Color>,
}

impl Palette {
	/// Indigo, white and sky blue of the slate theme (default)
	pub fn professional() -> Self {
		Self {
			colors: vec![
				Color::rgb(79, 70, 229),   // Indigo
				Color::rgb(248, 250, 252), // Slate white
				Color::rgb(56, 189, 248),  // Sky
			],
		}
	}

	/// Violet and white of the magic/cosmic page swarm
	pub fn cosmic() -> Self {
		Self {
			colors: vec![
				Color::rgb(102, 126, 234), // Periwinkle
				Color::rgb(255, 255, 255), // Starlight
				Color::rgb(67, 65, 144),   // Deep violet
			],
		}
	}

	/// Warm meadow tones of the Ghibli theme
	pub fn ghibli() -> Self {
		Self {
			colors: vec![
				Color::rgb(255, 223, 127), // Lantern yellow
				Color::rgb(139, 198, 123), // Meadow green
				Color::rgb(194, 231, 242), // Sky blue
				Color::rgb(248, 242, 226), // Cream
			],
		}
	}

	/// Parses every entry, failing on the first unrecognized color.
	pub fn parse<S: AsRef<str>>(colors: &[S]) -> Result<Self, String> {
		colors
			.iter()
			.map(|c| Color::parse(c.as_ref()).ok_or_else(|| c.as_ref().to_string()))
			.collect::<Result<Vec<_>, _>>()
			.map(|colors| Self { colors })
	}

	/// Entry at `index`, wrapping around.
	pub fn get(&self, index: usize) -> Color {
		self.colors[index % self.colors.len()]
	}

	/// Uniformly random entry. The palette must not be empty.
	pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
		self.get(rng.random_range(0..self.colors.len()))
	}

	/// Every entry as CSS text.
	pub fn to_css_list(&self) -> Vec<String> {
		self.colors.iter().map(|c| c.to_css()).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hex_forms() {
		assert_eq!(Color::parse("#4F46E5"), Some(Color::rgb(79, 70, 229)));
		assert_eq!(Color::parse("#fff"), Some(Color::rgb(255, 255, 255)));
		let translucent = Color::parse("#38BDF880").unwrap();
		assert_eq!((translucent.r, translucent.g, translucent.b), (56, 189, 248));
		assert!((translucent.a - 128.0 / 255.0).abs() < 1e-9);
	}

	#[test]
	fn parses_functional_notation() {
		assert_eq!(Color::parse("rgb(1, 2, 3)"), Some(Color::rgb(1, 2, 3)));
		assert_eq!(
			Color::parse(" rgba(10,20,30,0.5) "),
			Some(Color::rgba(10, 20, 30, 0.5))
		);
	}

	#[test]
	fn rejects_garbage() {
		for bad in ["", "#12", "#gggggg", "#ééé", "rgb(1,2)", "rgba(1,2,3,4)", "hsl(10, 20%)", "tealish", "rgb(1,2,3"] {
			assert_eq!(Color::parse(bad), None, "{bad:?} should not parse");
		}
	}

	#[test]
	fn parses_named_colors() {
		assert_eq!(Color::parse("white"), Some(Color::rgb(255, 255, 255)));
		assert_eq!(Color::parse("Teal"), Some(Color::rgb(0, 128, 128)));
		assert_eq!(Color::parse("rebeccapurple"), Some(Color::rgb(102, 51, 153)));
		assert_eq!(Color::parse("transparent"), Some(Color::rgba(0, 0, 0, 0.0)));
	}

	#[test]
	fn named_table_is_sorted_for_lookup() {
		assert!(NAMED.windows(2).all(|w| w[0].0 < w[1].0));
		assert_eq!(Color::parse("yellowgreen"), Some(Color::rgb(154, 205, 50)));
		assert_eq!(Color::parse("aliceblue"), Some(Color::rgb(240, 248, 255)));
	}

	#[test]
	fn parses_hsl_notation() {
		assert_eq!(Color::parse("hsl(0, 100%, 50%)"), Some(Color::rgb(255, 0, 0)));
		assert_eq!(Color::parse("hsl(120deg 100% 25%)"), Some(Color::rgb(0, 128, 0)));
		assert_eq!(Color::parse("hsl(240, 80%, 60%)"), Some(Color::rgb(71, 71, 235)));
		assert_eq!(
			Color::parse("hsla(0, 0%, 100%, 0.25)"),
			Some(Color::rgba(255, 255, 255, 0.25))
		);
		assert_eq!(Color::parse("hsl(-120, 100%, 50%)"), Some(Color::rgb(0, 0, 255)));
	}

	#[test]
	fn css_output_matches_input_hex() {
		assert_eq!(Color::parse("#111111").unwrap().to_css(), "#111111");
		assert_eq!(Color::rgb(79, 70, 229).with_alpha(0.5).to_css(), "rgba(79, 70, 229, 0.5)");
	}

	#[test]
	fn palette_parse_reports_offender() {
		assert_eq!(Palette::parse(&["#ffffff", "nope"]), Err("nope".to_string()));
		assert_eq!(Palette::parse(&["#ffffff"]).unwrap().colors.len(), 1);
	}

	#[test]
	fn presets_round_trip_through_css() {
		for palette in [Palette::professional(), Palette::cosmic(), Palette::ghibli()] {
			assert_eq!(Palette::parse(&palette.to_css_list()).unwrap(), palette);
		}
	}
}
