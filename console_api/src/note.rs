/// Semitones per octave.
pub const NOTES_PER_OCTAVE: i32 = 12;

const NOTE_NAMES: [&str; NOTES_PER_OCTAVE as usize] = [
    "C-", "C#", "D-", "D#", "E-", "F-", "F#", "G-", "G#", "A-", "A#", "B-",
];

/// Parses a tracker-style note name such as `C-4` or `D#5` into
/// `(note, octave)`. Octave digits `1..=8` map to octaves `0..=7`.
pub fn parse_note(name: &str) -> Option<(i32, i32)> {
    if name.len() != 3 || !name.is_ascii() {
        return None;
    }
    let (pitch, octave) = name.split_at(2);
    let note = NOTE_NAMES.iter().position(|candidate| *candidate == pitch)?;
    let octave = octave.parse::<i32>().ok().filter(|o| (1..=8).contains(o))?;
    Some((note as i32, octave - 1))
}

/// Splits an absolute note number into `(note, octave)`.
pub fn split_note(value: i32) -> (i32, i32) {
    (value % NOTES_PER_OCTAVE, value / NOTES_PER_OCTAVE)
}
