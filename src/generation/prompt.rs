use super::request::{GenerationRequest, TempoBucket};

/// Renders the text prompt sent to the audio model.
///
/// Shape: `"{mood} {genre} music in {key}, {tempo} tempo"`, followed by
/// `", with ..."` when instruments are given and
/// `", using chord progression ..."` when chords are given.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "{} {} music in {}",
        request.mood, request.genre, request.key
    );

    let tempo = match request.tempo_bucket() {
        TempoBucket::Slow => ", slow tempo",
        TempoBucket::Medium => ", medium tempo",
        TempoBucket::Fast => ", fast tempo",
    };
    prompt.push_str(tempo);

    if let Some((last, rest)) = request.instruments.split_last() {
        prompt.push_str(", with ");
        if rest.is_empty() {
            prompt.push_str(last);
        } else {
            prompt.push_str(&rest.join(", "));
            prompt.push_str(" and ");
            prompt.push_str(last);
        }
    }

    if let Some(chords) = request.chords.as_deref().filter(|c| !c.is_empty()) {
        prompt.push_str(", using chord progression ");
        prompt.push_str(chords);
    }

    prompt
}
