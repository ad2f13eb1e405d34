//! Country gazetteer
//!
//! Static name → coordinate table used to place countries on the map.
//! Aliases resolve to one canonical country so `UK` and `United Kingdom`
//! become the same node. Names missing from the table are unknown; rows
//! naming them are dropped by the normalizer.

use crate::identity::normalize_text;

/// A resolved country
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountryLocation {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

struct Entry {
    name: &'static str,
    aliases: &'static [&'static str],
    lat: f64,
    lng: f64,
}

const fn entry(name: &'static str, aliases: &'static [&'static str], lat: f64, lng: f64) -> Entry {
    Entry { name, aliases, lat, lng }
}

static COUNTRIES: &[Entry] = &[
    entry("Malaysia", &[], 4.2105, 101.9758),
    entry("China", &["people's republic of china", "prc"], 35.8617, 104.1954),
    entry("Turkey", &["türkiye", "turkiye"], 38.9637, 35.2433),
    entry("United Kingdom", &["uk", "great britain", "england", "scotland", "wales"], 55.3781, -3.4360),
    entry("United States", &["usa", "us", "united states of america"], 37.0902, -95.7129),
    entry("India", &[], 20.5937, 78.9629),
    entry("Iran", &["islamic republic of iran"], 32.4279, 53.6880),
    entry("Vietnam", &["viet nam"], 14.0583, 108.2772),
    entry("South Africa", &[], -30.5595, 22.9375),
    entry("Botswana", &[], -22.3285, 24.6849),
    entry("Sweden", &[], 60.1282, 18.6435),
    entry("Bangladesh", &[], 23.6850, 90.3563),
    entry("Indonesia", &[], -0.7893, 113.9213),
    entry("Oman", &[], 21.4735, 55.9754),
    entry("Jordan", &[], 30.5852, 36.2384),
    entry("Bahrain", &[], 26.0667, 50.5577),
    entry("Canada", &[], 56.1304, -106.3468),
    entry("Australia", &[], -25.2744, 133.7751),
    entry("Germany", &[], 51.1657, 10.4515),
    entry("France", &[], 46.2276, 2.2137),
    entry("Japan", &[], 36.2048, 138.2529),
    entry("South Korea", &["korea", "republic of korea", "korea, republic of"], 35.9078, 127.7669),
    entry("Brazil", &[], -14.2350, -51.9253),
    entry("Mexico", &[], 23.6345, -102.5528),
    entry("Italy", &[], 41.8719, 12.5674),
    entry("Spain", &[], 40.4637, -3.7492),
    entry("Netherlands", &["the netherlands", "holland"], 52.1326, 5.2913),
    entry("Singapore", &[], 1.3521, 103.8198),
    entry("Thailand", &[], 15.8700, 100.9925),
    entry("Pakistan", &[], 30.3753, 69.3451),
    entry("Egypt", &[], 26.8206, 30.8025),
    entry("Saudi Arabia", &[], 23.8859, 45.0792),
    entry("United Arab Emirates", &["uae"], 23.4241, 53.8478),
    entry("Russia", &["russian federation"], 61.5240, 105.3188),
    entry("Poland", &[], 51.9194, 19.1451),
    entry("Philippines", &[], 12.8797, 121.7740),
    entry("Nigeria", &[], 9.0820, 8.6753),
    entry("Kenya", &[], -0.0236, 37.9062),
    entry("Ghana", &[], 7.9465, -1.0232),
    entry("Ethiopia", &[], 9.1450, 40.4897),
    entry("Tanzania", &[], -6.3690, 34.8888),
    entry("Uganda", &[], 1.3733, 32.2903),
    entry("Zimbabwe", &[], -19.0154, 29.1549),
    entry("Zambia", &[], -13.1339, 27.8493),
    entry("Mauritius", &[], -20.3484, 57.5522),
    entry("Morocco", &[], 31.7917, -7.0926),
    entry("Algeria", &[], 28.0339, 1.6596),
    entry("Tunisia", &[], 33.8869, 9.5375),
    entry("Libya", &[], 26.3351, 17.2283),
    entry("Sudan", &[], 12.8628, 30.2176),
    entry("Yemen", &[], 15.5527, 48.5164),
    entry("Iraq", &[], 33.2232, 43.6793),
    entry("Qatar", &[], 25.3548, 51.1839),
    entry("Kuwait", &[], 29.3117, 47.4818),
    entry("Lebanon", &[], 33.8547, 35.8623),
    entry("Palestine", &["state of palestine"], 31.9522, 35.2332),
    entry("Syria", &["syrian arab republic"], 34.8021, 38.9968),
    entry("Sri Lanka", &[], 7.8731, 80.7718),
    entry("Nepal", &[], 28.3949, 84.1240),
    entry("Maldives", &[], 3.2028, 73.2207),
    entry("Brunei", &["brunei darussalam"], 4.5353, 114.7277),
    entry("Cambodia", &[], 12.5657, 104.9910),
    entry("Myanmar", &["burma"], 21.9162, 95.9560),
    entry("Hong Kong", &[], 22.3193, 114.1694),
    entry("Taiwan", &[], 23.6978, 120.9605),
    entry("Kazakhstan", &[], 48.0196, 66.9237),
    entry("Uzbekistan", &[], 41.3775, 64.5853),
    entry("New Zealand", &[], -40.9006, 174.8860),
    entry("Ireland", &[], 53.4129, -8.2439),
    entry("Switzerland", &[], 46.8182, 8.2275),
    entry("Belgium", &[], 50.5039, 4.4699),
    entry("Austria", &[], 47.5162, 14.5501),
    entry("Portugal", &[], 39.3999, -8.2245),
    entry("Greece", &[], 39.0742, 21.8243),
    entry("Norway", &[], 60.4720, 8.4689),
    entry("Denmark", &[], 56.2639, 9.5018),
    entry("Finland", &[], 61.9241, 25.7482),
    entry("Czech Republic", &["czechia"], 49.8175, 15.4730),
    entry("Hungary", &[], 47.1625, 19.5033),
    entry("Romania", &[], 45.9432, 24.9668),
    entry("Ukraine", &[], 48.3794, 31.1656),
    entry("Argentina", &[], -38.4161, -63.6167),
    entry("Chile", &[], -35.6751, -71.5430),
    entry("Colombia", &[], 4.5709, -74.2973),
    entry("Peru", &[], -9.1900, -75.0152),
];

/// Resolve a free-text country name, case-insensitively
pub fn lookup(name: &str) -> Option<CountryLocation> {
    let key = normalize_text(name);
    if key.is_empty() {
        return None;
    }

    COUNTRIES
        .iter()
        .find(|e| normalize_text(e.name) == key || e.aliases.iter().any(|a| *a == key))
        .map(|e| CountryLocation {
            name: e.name,
            lat: e.lat,
            lng: e.lng,
        })
}
