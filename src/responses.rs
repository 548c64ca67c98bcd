//! Canned reply and greeting tables.
//!
//! There is no language model behind the assistant: each supported language
//! maps to one literal reply and one literal greeting. The tables are
//! exhaustive matches over [`LanguageCode`], so adding a language without a
//! translation is a compile error rather than a silent English fallback.

use crate::language::LanguageCode;

/// Fixed apology appended when the reply pipeline itself fails.
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// Select the reply text for one chat turn.
///
/// Pre-composed text (the greeting path) is returned verbatim; otherwise
/// the per-language table entry is used. The user's message is accepted for
/// interface stability but not currently interpreted.
pub fn select_response<'a>(
    language: LanguageCode,
    override_text: Option<&'a str>,
    _user_message: &str,
) -> &'a str {
    match override_text {
        Some(text) => text,
        None => response_for(language),
    }
}

/// Literal assistant reply per language.
pub fn response_for(language: LanguageCode) -> &'static str {
    match language {
        LanguageCode::English => {
            "I understand you're looking for health insurance information. How can I assist you further?"
        }
        LanguageCode::Hindi => {
            "मुझे समझ में आता है कि आप स्वास्थ्य बीमा जानकारी की तलाश कर रहे हैं। मैं आपकी और कैसे सहायता कर सकता हूं?"
        }
        LanguageCode::Tamil => {
            "நீங்கள் சுகாதார காப்பீட்டுத் தகவல்களைத் தேடுகிறீர்கள் என்பதை நான் புரிந்துகொள்கிறேன். நான் உங்களுக்கு மேலும் எவ்வாறு உதவ முடியும்?"
        }
        LanguageCode::Telugu => {
            "మీరు ఆరోగ్య బీమా సమాచారం కోసం చూస్తున్నారని నేను అర్థం చేసుకున్నాను. నేను మీకు ఇంకా ఎలా సహాయం చేయగలను?"
        }
        LanguageCode::Bengali => {
            "আমি বুঝতে পারছি আপনি স্বাস্থ্য বীমা সম্পর্কিত তথ্য খুঁজছেন। আমি আপনাকে আর কীভাবে সাহায্য করতে পারি?"
        }
        LanguageCode::Marathi => {
            "आपण आरोग्य विमा माहिती शोधत आहात हे मला समजते. मी आपली आणखी कशी मदत करू शकतो?"
        }
        LanguageCode::Gujarati => {
            "હું સમજું છું કે તમે આરોગ્ય વીમા માહિતી શોધી રહ્યા છો. હું તમને વધુ કેવી રીતે મદદ કરી શકું?"
        }
        LanguageCode::Kannada => {
            "ನೀವು ಆರೋಗ್ಯ ವಿಮೆ ಮಾಹಿತಿಯನ್ನು ಹುಡುಕುತ್ತಿದ್ದೀರಿ ಎಂದು ನಾನು ಅರ್ಥಮಾಡಿಕೊಂಡಿದ್ದೇನೆ. ನಾನು ನಿಮಗೆ ಇನ್ನೂ ಹೇಗೆ ಸಹಾಯ ಮಾಡಬಹುದು?"
        }
        LanguageCode::Malayalam => {
            "നിങ്ങൾ ആരോഗ്യ ഇൻഷുറൻസ് വിവരങ്ങൾ തിരയുകയാണെന്ന് ഞാൻ മനസ്സിലാക്കുന്നു. എനിക്ക് നിങ്ങളെ ഇനിയും എങ്ങനെ സഹായിക്കാൻ കഴിയും?"
        }
        LanguageCode::Punjabi => {
            "ਮੈਂ ਸਮਝਦਾ ਹਾਂ ਕਿ ਤੁਸੀਂ ਸਿਹਤ ਬੀਮਾ ਜਾਣਕਾਰੀ ਲੱਭ ਰਹੇ ਹੋ। ਮੈਂ ਤੁਹਾਡੀ ਹੋਰ ਕਿਵੇਂ ਮਦਦ ਕਰ ਸਕਦਾ ਹਾਂ?"
        }
    }
}

/// Literal session-opening greeting per language.
pub fn greeting_for(language: LanguageCode) -> &'static str {
    match language {
        LanguageCode::English => {
            "Hello! I'm your health insurance assistant. How can I help you today?"
        }
        LanguageCode::Hindi => {
            "नमस्ते! मैं आपका स्वास्थ्य बीमा सहायक हूं। मैं आपकी कैसे मदद कर सकता हूं?"
        }
        LanguageCode::Tamil => {
            "வணக்கம்! நான் உங்கள் சுகாதார காப்பீட்டு உதவியாளர். நான் உங்களுக்கு எப்படி உதவ முடியும்?"
        }
        LanguageCode::Telugu => {
            "నమస్కారం! నేను మీ ఆరోగ్య బీమా సహాయకుడిని. నేను మీకు ఎలా సహాయం చేయగలను?"
        }
        LanguageCode::Bengali => {
            "নমস্কার! আমি আপনার স্বাস্থ্য বীমা সহায়ক। আমি আপনাকে কীভাবে সাহায্য করতে পারি?"
        }
        LanguageCode::Marathi => {
            "नमस्कार! मी आपला आरोग्य विमा सहाय्यक आहे. मी आपली कशी मदत करू शकतो?"
        }
        LanguageCode::Gujarati => {
            "નમસ્તે! હું તમારો આરોગ્ય વીમા સહાયક છું. હું તમને કેવી રીતે મદદ કરી શકું?"
        }
        LanguageCode::Kannada => {
            "ನಮಸ್ಕಾರ! ನಾನು ನಿಮ್ಮ ಆರೋಗ್ಯ ವಿಮೆ ಸಹಾಯಕ. ನಾನು ನಿಮಗೆ ಹೇಗೆ ಸಹಾಯ ಮಾಡಬಹುದು?"
        }
        LanguageCode::Malayalam => {
            "നമസ്കാരം! ഞാൻ നിങ്ങളുടെ ആരോഗ്യ ഇൻഷുറൻസ് സഹായി ആണ്. എനിക്ക് നിങ്ങളെ എങ്ങനെ സഹായിക്കാൻ കഴിയും?"
        }
        LanguageCode::Punjabi => {
            "ਸਤ ਸ੍ਰੀ ਅਕਾਲ! ਮੈਂ ਤੁਹਾਡਾ ਸਿਹਤ ਬੀਮਾ ਸਹਾਇਕ ਹਾਂ। ਮੈਂ ਤੁਹਾਡੀ ਕਿਵੇਂ ਮਦਦ ਕਰ ਸਕਦਾ ਹਾਂ?"
        }
    }
}

/// Startup check: every language must have non-empty reply, greeting and
/// voice entries. The matches above are exhaustive, so this only guards
/// against an empty literal sneaking in.
pub fn validate_tables() -> Result<(), String> {
    for lang in LanguageCode::ALL {
        if response_for(lang).trim().is_empty() {
            return Err(format!("empty response table entry for {lang}"));
        }
        if greeting_for(lang).trim().is_empty() {
            return Err(format!("empty greeting table entry for {lang}"));
        }
        if crate::speech::voice_id_for(lang).trim().is_empty() {
            return Err(format!("empty voice table entry for {lang}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_has_a_nonempty_response() {
        for lang in LanguageCode::ALL {
            assert!(
                !select_response(lang, None, "hello").is_empty(),
                "missing response for {lang}"
            );
        }
    }

    #[test]
    fn unsupported_code_gets_the_english_entry() {
        let lang = LanguageCode::parse_or_english("esperanto");
        assert_eq!(
            select_response(lang, None, "hello"),
            response_for(LanguageCode::English)
        );
    }

    #[test]
    fn override_text_is_returned_verbatim() {
        let greeting = greeting_for(LanguageCode::Hindi);
        assert_eq!(
            select_response(LanguageCode::Tamil, Some(greeting), "greeting"),
            greeting
        );
    }

    #[test]
    fn selection_ignores_the_user_message() {
        let a = select_response(LanguageCode::Bengali, None, "premiums?");
        let b = select_response(LanguageCode::Bengali, None, "claims?");
        assert_eq!(a, b);
    }

    #[test]
    fn tables_validate() {
        validate_tables().unwrap();
    }
}
