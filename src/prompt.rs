//! Prompt construction for the embrace composite.

/// Instruction used when no caption should appear in the image.
pub const NO_TEXT_INSTRUCTION: &str = "Do NOT add any text to the image. The final image must be \
     completely free of any text, name, or lettering.";

const TASK: &str = "Task: Create a photorealistic image by fusing the two provided photographs \
     into one unified scene.\n\
     Photo 1 (old childhood photo): the person as a child.\n\
     Photo 2 (recent adult photo): the same person as an adult.\n\
     Instructions:";

const EMBRACE: &str = "1. Realistically place the adult from Photo 2 tenderly embracing the child \
     from Photo 1. The interaction must look natural, affectionate and emotionally resonant.";

const BACKGROUND: &str = "2. Completely replace both original backgrounds with a new, soft blue \
     gradient background.";

const LIGHTING: &str = "3. Apply warm, natural lighting that unifies both subjects and creates a \
     nostalgic atmosphere.";

const CLOSING: &str = "5. Make the final composition unique and artistic, evoking nostalgia and \
     self-love. Avoid a simple 'copy-paste' look; integrate the subjects seamlessly and \
     coherently. Every result should be varied and emotive.";

/// The caption exactly as it will be rendered: control characters become
/// spaces, surrounding whitespace is trimmed, everything else is kept.
#[must_use]
pub fn caption_text(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// The caption instruction for a non-empty caption.
#[must_use]
pub fn caption_instruction(caption: &str) -> String {
    format!(
        "At the bottom center of the final image, add the text '{caption}' in an elegant, \
         legible font that complements the image."
    )
}

/// Build the full prompt. Names that are blank after [`caption_text`] count
/// as no name.
#[must_use]
pub fn build_prompt(name: &str) -> String {
    let caption = caption_text(name);
    let caption = if caption.is_empty() {
        NO_TEXT_INSTRUCTION.to_string()
    } else {
        caption_instruction(&caption)
    };
    let caption = format!("4. {caption}");
    [TASK, EMBRACE, BACKGROUND, LIGHTING, caption.as_str(), CLOSING].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPTION_MARKER: &str = "in an elegant, legible font";

    #[test]
    fn empty_name_asks_for_no_text() {
        for name in ["", "   ", "\t\n "] {
            let prompt = build_prompt(name);
            assert!(prompt.contains(NO_TEXT_INSTRUCTION));
            assert!(!prompt.contains(CAPTION_MARKER));
        }
    }

    #[test]
    fn name_is_trimmed_and_included_verbatim() {
        let prompt = build_prompt("  Ana María  ");
        assert!(prompt.contains("'Ana María'"));
        assert!(prompt.contains(CAPTION_MARKER));
        assert!(!prompt.contains(NO_TEXT_INSTRUCTION));
    }

    #[test]
    fn angle_brackets_are_ordinary_caption_text() {
        assert_eq!(caption_text("Ana <3 Luis"), "Ana <3 Luis");
        assert_eq!(caption_text("<b>Ana</b>"), "<b>Ana</b>");
        assert!(build_prompt("Ana <3 Luis").contains("'Ana <3 Luis'"));
    }

    #[test]
    fn control_characters_become_spaces() {
        assert_eq!(caption_text("  Ana\nLuis\t"), "Ana Luis");
        assert_eq!(caption_text("\u{7}"), "");
        assert_eq!(build_prompt("Ana\r\n"), build_prompt("Ana"));
    }

    #[test]
    fn steps_in_fixed_order() {
        let prompt = build_prompt("Ana");
        let steps = [
            "old childhood photo",
            "embracing",
            "soft blue gradient",
            "nostalgic atmosphere",
            "Ana",
            "copy-paste",
        ];
        let positions: Vec<usize> = steps
            .iter()
            .map(|needle| prompt.find(needle).expect(needle))
            .collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "out of order: {positions:?}"
        );
    }

    #[test]
    fn deterministic() {
        assert_eq!(build_prompt("Ana"), build_prompt("Ana"));
        assert_eq!(build_prompt(""), build_prompt("  "));
        assert!(!build_prompt("").is_empty());
    }
}
