//! OCR fact resolution
//!
//! Turns noisy, duplicate-laden OCR line lists (front, back, slab label)
//! into a promotions record of positively-resolved identity fields. Every
//! rule is independent; none blocks another, and the resolver never fails -
//! malformed input degrades to fields simply being absent.

use strsim::jaro_winkler;
use tracing::debug;

use crate::identity::{FieldSource, Promotions};
use crate::ocr::tables::{
    canonical_team, League, BRANDS, GRADERS, GRADE_DESCRIPTORS, LEAGUES, SLAB_MARKERS,
};
use crate::ocr::OcrLine;

/// Plausible card-set year range
const YEAR_MIN: u32 = 1950;
const YEAR_MAX: u32 = 2026;
/// Similarity floor for fuzzy brand keyword matching (tolerates OCR misreads)
const FUZZY_KEYWORD_SIMILARITY: f64 = 0.92;

/// A sanitized OCR line with its normalized form and origin region
#[derive(Debug, Clone)]
struct Line {
    text: String,
    normalized: String,
    confidence: f32,
    source: FieldSource,
}

/// Resolve card facts from the three OCR regions.
///
/// Returns only fields that were positively resolved; everything else is
/// absent. With no usable lines at all, the result is an empty promotions
/// record - never partial garbage.
pub fn resolve(front: &[OcrLine], back: &[OcrLine], slab: &[OcrLine]) -> Promotions {
    let front = sanitize(front, FieldSource::Front);
    let back = sanitize(back, FieldSource::Back);
    let slab = sanitize(slab, FieldSource::Slab);

    let mut promotions = Promotions::default();
    if front.is_empty() && back.is_empty() && slab.is_empty() {
        return promotions;
    }

    let groups: [&[Line]; 3] = [&front, &back, &slab];
    let all: Vec<&Line> = groups.iter().flat_map(|g| g.iter()).collect();

    if let Some((year, source)) = resolve_year(&groups) {
        promotions.sources.insert("year".to_string(), source);
        promotions.year = Some(year);
    }

    let team = resolve_team(&all);
    if let Some(team) = &team {
        promotions
            .sources
            .insert("team".to_string(), team.source);
        promotions.team = Some(team.display.clone());
        // Sport and league come only from a resolved team
        promotions
            .sources
            .insert("sport".to_string(), team.source);
        promotions.sport = Some(team.league.sport.to_string());
        promotions
            .sources
            .insert("league".to_string(), team.source);
        promotions.league = Some(team.league.name.to_string());
    }

    let brand = resolve_brand(&groups);
    if let Some(brand) = &brand {
        promotions
            .sources
            .insert("brand".to_string(), brand.source);
        promotions.brand = Some(brand.brand.to_string());
        promotions
            .sources
            .insert("setName".to_string(), brand.source);
        promotions.set_name = Some(brand.set_name.clone());
    }

    let team_normalized = team.as_ref().map(|t| t.line_normalized.as_str());
    let brand_keyword = brand.as_ref().map(|b| b.keyword);
    if let Some((player, source)) = resolve_player(&all, team_normalized, brand_keyword) {
        promotions.sources.insert("player".to_string(), source);
        promotions.player = Some(player);
    }

    // Slab labels carry the most reliable grading text, so scan them first
    let grading_order: [&[Line]; 3] = [&slab, &back, &front];
    let grading = resolve_grading(&grading_order);
    if let Some((grader, source)) = grading.grader {
        promotions.sources.insert("grader".to_string(), source);
        promotions.grader = Some(grader);
    }
    if let Some((grade, source)) = grading.grade {
        promotions.sources.insert("grade".to_string(), source);
        promotions.grade = Some(grade);
    }
    if let Some((condition, source)) = grading.condition {
        promotions.sources.insert("condition".to_string(), source);
        promotions.condition = Some(condition);
    }
    if let Some((slabbed, source)) = grading.is_slabbed {
        promotions.sources.insert("isSlabbed".to_string(), source);
        promotions.is_slabbed = Some(slabbed);
    }

    promotions.card_title = compose_title(&promotions);

    debug!(
        "resolver promoted {} field(s)",
        promotions.entries().iter().filter(|(_, v)| v.is_some()).count()
    );
    promotions
}

/// Legacy single-list mode: best-effort player only.
///
/// Some callers hold one undifferentiated line list; the looser heuristic
/// takes the first line of two or more words that contains letters and is
/// not uppercase-only (uppercase-only lines skew brand/team on card stock).
pub fn resolve_flat(lines: &[OcrLine]) -> Promotions {
    let lines = sanitize(lines, FieldSource::Front);
    let mut promotions = Promotions::default();

    for line in &lines {
        let words = line.text.split_whitespace().count();
        let has_letters = line.text.chars().any(|c| c.is_alphabetic());
        if words >= 2 && has_letters && !is_all_caps(&line.text) {
            promotions.player = Some(line.text.clone());
            break;
        }
    }

    promotions
}

/// Drop empty/whitespace lines and attach normalized text
fn sanitize(lines: &[OcrLine], source: FieldSource) -> Vec<Line> {
    lines
        .iter()
        .filter_map(|line| {
            let text = line.text.trim();
            if text.is_empty() {
                return None;
            }
            Some(Line {
                text: text.to_string(),
                normalized: normalize_text(text),
                confidence: line.confidence,
                source,
            })
        })
        .collect()
}

/// Lowercase, strip punctuation to spaces, collapse whitespace
fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    out.trim_end().to_string()
}

/// True when `text` contains `phrase` as a run of whole words
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    if needle.is_empty() || words.len() < needle.len() {
        return false;
    }
    words.windows(needle.len()).any(|w| w == needle.as_slice())
}

/// No lowercase letters, at least one uppercase letter
fn is_all_caps(text: &str) -> bool {
    let mut has_upper = false;
    for ch in text.chars() {
        if ch.is_lowercase() {
            return false;
        }
        if ch.is_uppercase() {
            has_upper = true;
        }
    }
    has_upper
}

/// Team line shape: starts with a capital, then capitals, whitespace and
/// the punctuation seen in franchise names; digits disqualify
fn is_team_shape(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    let mut len = 1;
    for ch in chars {
        if !(ch.is_ascii_uppercase() || ch.is_whitespace() || matches!(ch, '.' | '\'' | '&' | '-'))
        {
            return false;
        }
        len += 1;
    }
    len >= 2
}

/// Player word shape: a capital followed by capitals or name punctuation
fn is_player_word(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_uppercase() || matches!(ch, '\'' | '.' | '-'))
}

fn parse_four_digit_year(token: &str) -> Option<u32> {
    if token.len() != 4 || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !(token.starts_with("19") || token.starts_with("20")) {
        return None;
    }
    let year: u32 = token.parse().ok()?;
    (YEAR_MIN..=YEAR_MAX).contains(&year).then_some(year)
}

/// Two-digit year inference: >= 50 is 1900s, <= 26 is 2000s. Tokens 27-49
/// intentionally resolve to nothing.
fn parse_two_digit_year(token: &str) -> Option<u32> {
    if token.len() != 2 || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: u32 = token.parse().ok()?;
    if n >= 50 {
        Some(1900 + n)
    } else if n <= 26 {
        Some(2000 + n)
    } else {
        None
    }
}

/// Manufacturer keyword found in a line. Exact phrase match first, then a
/// digit-for-letter OCR confusion pass (0/O, 1/I, 5/S, 8/B), then fuzzy
/// per-token matching for heavier misreads of single-word keywords.
fn brand_in(text: &str) -> Option<(&'static str, &'static str)> {
    let upper_norm = normalize_upper(text);
    for &(keyword, display) in BRANDS {
        if contains_phrase(&upper_norm, &normalize_upper(keyword)) {
            return Some((keyword, display));
        }
    }
    for token in upper_norm.split_whitespace() {
        let corrected = correct_ocr_confusions(token);
        for &(keyword, display) in BRANDS {
            if keyword.contains(' ') {
                continue;
            }
            if corrected.as_deref() == Some(keyword)
                || jaro_winkler(token, keyword) >= FUZZY_KEYWORD_SIMILARITY
            {
                return Some((keyword, display));
            }
        }
    }
    None
}

/// Remap digits the OCR commonly confuses with letters. Only applies to
/// tokens that contain at least one letter, so real numbers pass through.
fn correct_ocr_confusions(token: &str) -> Option<String> {
    if !token.chars().any(|c| c.is_ascii_alphabetic()) || !token.chars().any(|c| c.is_ascii_digit())
    {
        return None;
    }
    Some(
        token
            .chars()
            .map(|c| match c {
                '0' => 'O',
                '1' => 'I',
                '5' => 'S',
                '8' => 'B',
                other => other,
            })
            .collect(),
    )
}

/// Uppercase text with punctuation collapsed to spaces, for phrase matching
fn normalize_upper(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    out.trim_end().to_string()
}

/// Year rule: prefer the oldest plausible 4-digit year anywhere; fall back
/// to a 2-digit token adjacent to a brand keyword line
fn resolve_year(groups: &[&[Line]]) -> Option<(String, FieldSource)> {
    let mut best: Option<(u32, FieldSource)> = None;
    for lines in groups {
        for line in *lines {
            for token in line.normalized.split_whitespace() {
                if let Some(year) = parse_four_digit_year(token) {
                    if best.map_or(true, |(b, _)| year < b) {
                        best = Some((year, line.source));
                    }
                }
            }
        }
    }
    if let Some((year, source)) = best {
        return Some((year.to_string(), source));
    }

    // 2-digit inference, only next to a brand keyword line
    let mut best: Option<(u32, FieldSource)> = None;
    for lines in groups {
        for (i, line) in lines.iter().enumerate() {
            if brand_in(&line.text).is_none() {
                continue;
            }
            let lo = i.saturating_sub(1);
            let hi = (i + 1).min(lines.len() - 1);
            for neighbor in &lines[lo..=hi] {
                for token in neighbor.normalized.split_whitespace() {
                    if let Some(year) = parse_two_digit_year(token) {
                        if best.map_or(true, |(b, _)| year < b) {
                            best = Some((year, neighbor.source));
                        }
                    }
                }
            }
        }
    }
    best.map(|(year, source)| (year.to_string(), source))
}

struct TeamResolution {
    display: String,
    line_normalized: String,
    league: &'static League,
    source: FieldSource,
}

/// Team rule: all-caps franchise-shaped lines matched against the league
/// tables; most words wins, then OCR confidence, then raw length
fn resolve_team(all: &[&Line]) -> Option<TeamResolution> {
    struct Candidate<'a> {
        line: &'a Line,
        words: usize,
    }

    let mut best: Option<Candidate> = None;
    for &line in all {
        if !is_team_shape(&line.text) {
            continue;
        }
        let matches_table = LEAGUES
            .iter()
            .any(|league| league.teams.iter().any(|t| contains_phrase(&line.normalized, t)));
        if !matches_table {
            continue;
        }

        let words = line.normalized.split_whitespace().count();
        let better = match &best {
            None => true,
            Some(current) => {
                words > current.words
                    || (words == current.words && line.confidence > current.line.confidence)
                    || (words == current.words
                        && line.confidence == current.line.confidence
                        && line.text.len() > current.line.text.len())
            }
        };
        if better {
            best = Some(Candidate { line, words });
        }
    }

    let line = best?.line;

    // A nickname may exist in several leagues; pick the league whose full
    // franchise name shares the most words with the line
    let mut chosen: Option<(&'static League, &'static str, usize)> = None;
    for league in &LEAGUES {
        for &token in league.teams {
            if !contains_phrase(&line.normalized, token) {
                continue;
            }
            let overlap = canonical_team(token)
                .map(|full| {
                    normalize_text(full)
                        .split_whitespace()
                        .filter(|w| contains_phrase(&line.normalized, w))
                        .count()
                })
                .unwrap_or(0);
            if chosen.map_or(true, |(_, _, best_overlap)| overlap > best_overlap) {
                chosen = Some((league, token, overlap));
            }
        }
    }
    let (league, token, _) = chosen?;

    // Bare nicknames display as the full franchise name
    let display = if line.normalized == token {
        canonical_team(token)
            .map(|full| full.to_string())
            .unwrap_or_else(|| title_case(&line.text))
    } else {
        title_case(&line.text)
    };

    Some(TeamResolution {
        display,
        line_normalized: line.normalized.clone(),
        league,
        source: line.source,
    })
}

struct BrandResolution {
    brand: &'static str,
    keyword: &'static str,
    set_name: String,
    source: FieldSource,
}

/// Brand/set rule: all-caps manufacturer lines, optionally concatenated
/// with an immediately following all-caps line (set names split across two
/// printed lines); year tokens stripped before scoring
fn resolve_brand(groups: &[&[Line]]) -> Option<BrandResolution> {
    struct Candidate {
        text: String,
        confidence: f32,
        source: FieldSource,
        keyword: &'static str,
        display: &'static str,
    }

    let mut candidates: Vec<Candidate> = Vec::new();
    for lines in groups {
        for (i, line) in lines.iter().enumerate() {
            if !is_all_caps(&line.text) {
                continue;
            }
            let Some((keyword, display)) = brand_in(&line.text) else {
                continue;
            };
            candidates.push(Candidate {
                text: line.text.clone(),
                confidence: line.confidence,
                source: line.source,
                keyword,
                display,
            });
            if let Some(next) = lines.get(i + 1) {
                if is_all_caps(&next.text) {
                    candidates.push(Candidate {
                        text: format!("{} {}", line.text, next.text),
                        confidence: (line.confidence + next.confidence) / 2.0,
                        source: line.source,
                        keyword,
                        display,
                    });
                }
            }
        }
    }

    let mut best: Option<(Candidate, String, usize)> = None;
    for candidate in candidates {
        let stripped = strip_year_tokens(&candidate.text);
        let words = stripped.split_whitespace().count();
        if words == 0 {
            continue;
        }
        let better = match &best {
            None => true,
            Some((current, _, current_words)) => {
                words > *current_words
                    || (words == *current_words && candidate.confidence > current.confidence)
            }
        };
        if better {
            best = Some((candidate, stripped, words));
        }
    }

    best.map(|(candidate, stripped, _)| BrandResolution {
        brand: candidate.display,
        keyword: candidate.keyword,
        set_name: title_case(&stripped),
        source: candidate.source,
    })
}

/// Remove embedded 4-digit year tokens from a candidate phrase
fn strip_year_tokens(text: &str) -> String {
    text.split_whitespace()
        .filter(|token| parse_four_digit_year(&normalize_text(token)).is_none())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Player rule: name-shaped all-caps lines, ranked by how often the same
/// text recurs across all supplied lines (front/back duplication raises
/// confidence), then raw length, then OCR confidence
fn resolve_player(
    all: &[&Line],
    team_normalized: Option<&str>,
    brand_keyword: Option<&str>,
) -> Option<(String, FieldSource)> {
    struct Group<'a> {
        line: &'a Line,
        count: usize,
    }

    let mut groups: Vec<Group> = Vec::new();
    for &line in all {
        let words: Vec<&str> = line.text.split_whitespace().collect();
        if !(2..=4).contains(&words.len()) || !words.iter().all(|w| is_player_word(w)) {
            continue;
        }
        if team_normalized == Some(line.normalized.as_str()) {
            continue;
        }
        if let Some(keyword) = brand_keyword {
            if contains_phrase(&normalize_upper(&line.text), &normalize_upper(keyword)) {
                continue;
            }
        }

        match groups.iter_mut().find(|g| g.line.normalized == line.normalized) {
            Some(group) => group.count += 1,
            None => groups.push(Group { line, count: 1 }),
        }
    }

    let mut best: Option<&Group> = None;
    for group in &groups {
        let better = match best {
            None => true,
            Some(current) => {
                group.count > current.count
                    || (group.count == current.count
                        && group.line.text.len() > current.line.text.len())
                    || (group.count == current.count
                        && group.line.text.len() == current.line.text.len()
                        && group.line.confidence > current.line.confidence)
            }
        };
        if better {
            best = Some(group);
        }
    }

    best.map(|group| (format_player_name(&group.line.text), group.line.source))
}

/// Title-case a player name, preserving generational suffixes
fn format_player_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let bare = word.trim_end_matches('.');
            match bare {
                "JR" => "Jr.".to_string(),
                "SR" => "Sr.".to_string(),
                "II" | "III" | "IV" | "V" => bare.to_string(),
                _ => title_case_word(word),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_start = true;
    for ch in word.chars() {
        if matches!(ch, '\'' | '-' | '.') {
            out.push(ch);
            at_start = true;
        } else if at_start {
            out.extend(ch.to_uppercase());
            at_start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Default)]
struct GradingResolution {
    grader: Option<(String, FieldSource)>,
    grade: Option<(String, FieldSource)>,
    condition: Option<(String, FieldSource)>,
    is_slabbed: Option<(bool, FieldSource)>,
}

/// Grading rule: grading-company keyword plus an adjacent 1-10 grade and
/// optional descriptor. Lists are scanned in the caller's order (slab
/// label first).
fn resolve_grading(groups: &[&[Line]]) -> GradingResolution {
    let mut resolution = GradingResolution::default();

    'outer: for lines in groups {
        for (i, line) in lines.iter().enumerate() {
            let upper = normalize_upper(&line.text);
            let Some(&(_, display)) = GRADERS
                .iter()
                .find(|&&(keyword, _)| contains_phrase(&upper, keyword))
            else {
                continue;
            };

            resolution.grader = Some((display.to_string(), line.source));
            resolution.is_slabbed = Some((true, line.source));

            // Grade on the grader line first, then its neighbors
            let window = [Some(i), i.checked_sub(1), Some(i + 1)];
            for idx in window.into_iter().flatten() {
                let Some(candidate) = lines.get(idx) else {
                    continue;
                };
                if resolution.grade.is_none() {
                    if let Some(grade) = find_grade_token(&candidate.text) {
                        resolution.grade = Some((grade, candidate.source));
                    }
                }
                if resolution.condition.is_none() {
                    let upper = normalize_upper(&candidate.text);
                    if let Some(&(_, display)) = GRADE_DESCRIPTORS
                        .iter()
                        .find(|&&(keyword, _)| contains_phrase(&upper, &normalize_upper(keyword)))
                    {
                        resolution.condition = Some((display.to_string(), candidate.source));
                    }
                }
            }
            break 'outer;
        }
    }

    // Certification markers flag a slab even without a grader hit
    if resolution.is_slabbed.is_none() {
        'markers: for lines in groups {
            for line in *lines {
                let upper = normalize_upper(&line.text);
                if SLAB_MARKERS
                    .iter()
                    .any(|marker| contains_phrase(&upper, marker))
                {
                    resolution.is_slabbed = Some((true, line.source));
                    break 'markers;
                }
            }
        }
    }

    resolution
}

/// A 1-10 grade token (halves allowed), parsed from raw text
fn find_grade_token(text: &str) -> Option<String> {
    for token in text.split_whitespace() {
        let token = token.trim_matches(|c: char| !(c.is_ascii_digit() || c == '.'));
        if token.is_empty() {
            continue;
        }
        let Ok(value) = token.parse::<f32>() else {
            continue;
        };
        if !(1.0..=10.0).contains(&value) || (value * 2.0).fract() != 0.0 {
            continue;
        }
        return Some(if value.fract() == 0.0 {
            format!("{}", value as u32)
        } else {
            format!("{:.1}", value)
        });
    }
    None
}

/// Compose a display title once enough of the identity resolves
fn compose_title(promotions: &Promotions) -> Option<String> {
    let player = promotions.player.as_ref()?;
    if promotions.year.is_none() && promotions.set_name.is_none() {
        return None;
    }
    let mut parts = Vec::new();
    if let Some(year) = &promotions.year {
        parts.push(year.clone());
    }
    if let Some(set_name) = &promotions.set_name {
        parts.push(set_name.clone());
    }
    parts.push(player.clone());
    Some(parts.join(" "))
}
