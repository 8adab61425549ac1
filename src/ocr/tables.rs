//! Static lookup tables for OCR fact resolution
//!
//! Flat constant tables: league team nicknames, canonical franchise names,
//! manufacturer keywords, grading companies and grade descriptors. The
//! resolver matches normalized OCR text against these; nothing here is
//! learned or configurable.

/// One league's team vocabulary
pub struct League {
    pub name: &'static str,
    pub sport: &'static str,
    /// Normalized (lowercase) nickname tokens as printed on cards
    pub teams: &'static [&'static str],
}

pub static LEAGUES: [League; 4] = [
    League {
        name: "MLB",
        sport: "Baseball",
        teams: &[
            "angels", "astros", "athletics", "blue jays", "braves", "brewers", "cardinals",
            "cubs", "diamondbacks", "dodgers", "giants", "guardians", "mariners", "marlins",
            "mets", "nationals", "orioles", "padres", "phillies", "pirates", "rangers", "rays",
            "red sox", "reds", "rockies", "royals", "tigers", "twins", "white sox", "yankees",
        ],
    },
    League {
        name: "NFL",
        sport: "Football",
        teams: &[
            "49ers", "bears", "bengals", "bills", "broncos", "browns", "buccaneers",
            "cardinals", "chargers", "chiefs", "colts", "commanders", "cowboys", "dolphins",
            "eagles", "falcons", "giants", "jaguars", "jets", "lions", "packers", "panthers",
            "patriots", "raiders", "rams", "ravens", "saints", "seahawks", "steelers",
            "texans", "titans", "vikings",
        ],
    },
    League {
        name: "NBA",
        sport: "Basketball",
        teams: &[
            "76ers", "bucks", "bulls", "cavaliers", "celtics", "clippers", "grizzlies",
            "hawks", "heat", "hornets", "jazz", "kings", "knicks", "lakers", "magic",
            "mavericks", "nets", "nuggets", "pacers", "pelicans", "pistons", "raptors",
            "rockets", "spurs", "suns", "thunder", "timberwolves", "trail blazers",
            "warriors", "wizards",
        ],
    },
    League {
        name: "NHL",
        sport: "Hockey",
        teams: &[
            "avalanche", "blackhawks", "blue jackets", "blues", "bruins", "canadiens",
            "canucks", "capitals", "coyotes", "devils", "ducks", "flames", "flyers",
            "golden knights", "hurricanes", "islanders", "jets", "kings", "kraken",
            "lightning", "maple leafs", "oilers", "panthers", "penguins", "predators",
            "rangers", "red wings", "sabres", "senators", "sharks", "stars", "wild",
        ],
    },
];

/// Canonical franchise names for short nicknames, used for display when a
/// card prints only the nickname. Nicknames shared across leagues map to
/// the franchise most common on vintage card stock.
pub const CANONICAL_TEAMS: &[(&str, &str)] = &[
    ("angels", "Los Angeles Angels"),
    ("astros", "Houston Astros"),
    ("athletics", "Oakland Athletics"),
    ("blue jays", "Toronto Blue Jays"),
    ("braves", "Atlanta Braves"),
    ("brewers", "Milwaukee Brewers"),
    ("cardinals", "St. Louis Cardinals"),
    ("cubs", "Chicago Cubs"),
    ("diamondbacks", "Arizona Diamondbacks"),
    ("dodgers", "Los Angeles Dodgers"),
    ("giants", "San Francisco Giants"),
    ("guardians", "Cleveland Guardians"),
    ("mariners", "Seattle Mariners"),
    ("marlins", "Miami Marlins"),
    ("mets", "New York Mets"),
    ("nationals", "Washington Nationals"),
    ("orioles", "Baltimore Orioles"),
    ("padres", "San Diego Padres"),
    ("phillies", "Philadelphia Phillies"),
    ("pirates", "Pittsburgh Pirates"),
    ("rangers", "Texas Rangers"),
    ("rays", "Tampa Bay Rays"),
    ("red sox", "Boston Red Sox"),
    ("reds", "Cincinnati Reds"),
    ("rockies", "Colorado Rockies"),
    ("royals", "Kansas City Royals"),
    ("tigers", "Detroit Tigers"),
    ("twins", "Minnesota Twins"),
    ("white sox", "Chicago White Sox"),
    ("yankees", "New York Yankees"),
    ("49ers", "San Francisco 49ers"),
    ("bears", "Chicago Bears"),
    ("bengals", "Cincinnati Bengals"),
    ("bills", "Buffalo Bills"),
    ("broncos", "Denver Broncos"),
    ("browns", "Cleveland Browns"),
    ("buccaneers", "Tampa Bay Buccaneers"),
    ("chargers", "Los Angeles Chargers"),
    ("chiefs", "Kansas City Chiefs"),
    ("colts", "Indianapolis Colts"),
    ("commanders", "Washington Commanders"),
    ("cowboys", "Dallas Cowboys"),
    ("dolphins", "Miami Dolphins"),
    ("eagles", "Philadelphia Eagles"),
    ("falcons", "Atlanta Falcons"),
    ("jaguars", "Jacksonville Jaguars"),
    ("jets", "New York Jets"),
    ("lions", "Detroit Lions"),
    ("packers", "Green Bay Packers"),
    ("panthers", "Carolina Panthers"),
    ("patriots", "New England Patriots"),
    ("raiders", "Las Vegas Raiders"),
    ("rams", "Los Angeles Rams"),
    ("ravens", "Baltimore Ravens"),
    ("saints", "New Orleans Saints"),
    ("seahawks", "Seattle Seahawks"),
    ("steelers", "Pittsburgh Steelers"),
    ("texans", "Houston Texans"),
    ("titans", "Tennessee Titans"),
    ("vikings", "Minnesota Vikings"),
    ("76ers", "Philadelphia 76ers"),
    ("bucks", "Milwaukee Bucks"),
    ("bulls", "Chicago Bulls"),
    ("cavaliers", "Cleveland Cavaliers"),
    ("celtics", "Boston Celtics"),
    ("clippers", "Los Angeles Clippers"),
    ("grizzlies", "Memphis Grizzlies"),
    ("hawks", "Atlanta Hawks"),
    ("heat", "Miami Heat"),
    ("hornets", "Charlotte Hornets"),
    ("jazz", "Utah Jazz"),
    ("kings", "Sacramento Kings"),
    ("knicks", "New York Knicks"),
    ("lakers", "Los Angeles Lakers"),
    ("magic", "Orlando Magic"),
    ("mavericks", "Dallas Mavericks"),
    ("nets", "Brooklyn Nets"),
    ("nuggets", "Denver Nuggets"),
    ("pacers", "Indiana Pacers"),
    ("pelicans", "New Orleans Pelicans"),
    ("pistons", "Detroit Pistons"),
    ("raptors", "Toronto Raptors"),
    ("rockets", "Houston Rockets"),
    ("spurs", "San Antonio Spurs"),
    ("suns", "Phoenix Suns"),
    ("thunder", "Oklahoma City Thunder"),
    ("timberwolves", "Minnesota Timberwolves"),
    ("trail blazers", "Portland Trail Blazers"),
    ("warriors", "Golden State Warriors"),
    ("wizards", "Washington Wizards"),
    ("avalanche", "Colorado Avalanche"),
    ("blackhawks", "Chicago Blackhawks"),
    ("blue jackets", "Columbus Blue Jackets"),
    ("blues", "St. Louis Blues"),
    ("bruins", "Boston Bruins"),
    ("canadiens", "Montreal Canadiens"),
    ("canucks", "Vancouver Canucks"),
    ("capitals", "Washington Capitals"),
    ("coyotes", "Arizona Coyotes"),
    ("devils", "New Jersey Devils"),
    ("ducks", "Anaheim Ducks"),
    ("flames", "Calgary Flames"),
    ("flyers", "Philadelphia Flyers"),
    ("golden knights", "Vegas Golden Knights"),
    ("hurricanes", "Carolina Hurricanes"),
    ("islanders", "New York Islanders"),
    ("kraken", "Seattle Kraken"),
    ("lightning", "Tampa Bay Lightning"),
    ("maple leafs", "Toronto Maple Leafs"),
    ("oilers", "Edmonton Oilers"),
    ("penguins", "Pittsburgh Penguins"),
    ("predators", "Nashville Predators"),
    ("red wings", "Detroit Red Wings"),
    ("sabres", "Buffalo Sabres"),
    ("senators", "Ottawa Senators"),
    ("sharks", "San Jose Sharks"),
    ("stars", "Dallas Stars"),
    ("wild", "Minnesota Wild"),
];

/// Manufacturer keywords as printed (uppercase) with display casing
pub const BRANDS: &[(&str, &str)] = &[
    ("TOPPS", "Topps"),
    ("PANINI", "Panini"),
    ("DONRUSS", "Donruss"),
    ("BOWMAN", "Bowman"),
    ("UPPER DECK", "Upper Deck"),
    ("FLEER", "Fleer"),
    ("SCORE", "Score"),
    ("OPTIC", "Optic"),
    ("PRIZM", "Prizm"),
    ("MOSAIC", "Mosaic"),
    ("SELECT", "Select"),
    ("LEAF", "Leaf"),
    ("STADIUM CLUB", "Stadium Club"),
    ("GYPSY QUEEN", "Gypsy Queen"),
    ("HERITAGE", "Heritage"),
    ("CHRONICLES", "Chronicles"),
];

/// Grading companies as printed on slab labels
pub const GRADERS: &[(&str, &str)] = &[
    ("PSA", "PSA"),
    ("BGS", "BGS"),
    ("BECKETT", "Beckett"),
    ("SGC", "SGC"),
    ("CGC", "CGC"),
    ("CSG", "CSG"),
    ("HGA", "HGA"),
];

/// Grade descriptors, longest phrases first so "GEM MINT" wins over "MINT"
pub const GRADE_DESCRIPTORS: &[(&str, &str)] = &[
    ("GEM MINT", "Gem Mint"),
    ("GEM MT", "Gem Mint"),
    ("PRISTINE", "Pristine"),
    ("NM-MT", "Near Mint-Mint"),
    ("NEAR MINT", "Near Mint"),
    ("MINT", "Mint"),
    ("EXCELLENT", "Excellent"),
    ("VERY GOOD", "Very Good"),
    ("AUTHENTIC", "Authentic"),
];

/// Tokens that mark certification text on a slab label
pub const SLAB_MARKERS: &[&str] = &["CERT", "CERTIFICATION", "SERIAL"];

/// Canonical franchise name for a nickname, if known
pub fn canonical_team(nickname: &str) -> Option<&'static str> {
    CANONICAL_TEAMS
        .iter()
        .find(|(n, _)| *n == nickname)
        .map(|(_, full)| *full)
}
