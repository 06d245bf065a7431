//! Prompt templates for the vision model.
//!
//! The expected answer formats must stay in sync with
//! [`Schema::seo`](crate::response::Schema::seo) and
//! [`Schema::accessibility`](crate::response::Schema::accessibility).

/// Placeholder replaced with the book context.
const CONTEXT_PLACEHOLDER: &str = "{book_context}";

/// Used when no book context was given.
pub const DEFAULT_BOOK_CONTEXT: &str =
    "Es wurde kein spezifischer Buchkontext für dieses Bild bereitgestellt.";

/// Prompt for SEO `alt` and `title` attributes.
pub const SEO_PROMPT: &str = r#"Analysiere das folgende Bild sorgfältig.
Deine Aufgabe ist es, SEO-optimierte HTML-Attribute für dieses Bild zu generieren:
1. Ein 'alt'-Attribut (Alternativtext)
2. Ein 'title'-Attribut
Beachte dabei die aktuellen SEO Best Practices:
- Das 'alt'-Attribut muss das Bild präzise und prägnant beschreiben. Es ist entscheidend für Barrierefreiheit und das Verständnis des Bildinhalts durch Suchmaschinen. Beschreibe Objekte, Personen, Aktionen und ggf. Text im Bild. Vermeide Keyword-Stuffing.
- Das 'title'-Attribut kann zusätzliche kontextbezogene Informationen liefern.
Gib *nur* die beiden Attribute im folgenden Format zurück, ohne zusätzliche Erklärungen oder Formatierungen:
ALT: [Hier der generierte Alt-Text]
TITLE: [Hier der generierte Title-Text]
"#;

const ACCESSIBILITY_TEMPLATE: &str = r#"Du bist eine KI, spezialisiert auf die Erstellung barrierefreier Bildbeschreibungen (Alternativtexte und gegebenenfalls erweiterte Beschreibungen) für E-Books. Deine Aufgabe ist es, Bilder für blinde und sehbehinderte Leser zugänglich zu machen, gemäß den WCAG-Richtlinien und den Vorgaben unseres Verlags.
WICHTIG: Deine Antwort enthält ausschließlich die Bildbeschreibung im vorgegebenen Format. Keine Einleitung, keine abschließenden Bemerkungen, keine Erklärungen zur Vorgehensweise.
Buchkontext: {book_context}
Richtlinien:
Zweck und Zielgruppe:
- Vermittle präzise, was auf dem Bild zu sehen ist und welche Inhalte es transportiert.
- Stelle die Funktion des Bildes im Buchkontext klar.
Stil und Formulierung:
- Neutral und deskriptiv, ohne Interpretation oder Wertung.
- Direkter Einstieg: keine Formulierungen wie „Das Foto zeigt…“ oder „Auf dem Bild ist zu sehen…“.
- Anführungszeichen ausschließlich als französische Guillemets («Beispiel»).
- Klar, präzise und allgemein verständlich.
Inhalt und Struktur:
- Vom Allgemeinen zum Speziellen.
- Beschreibe alle relevanten Elemente und gib ggf. den Bildtyp an.
- Bei Karten, Tabellen und Diagrammen: erkläre die Daten und ihre Beziehungen.
- Konzentriere dich auf das, was für das Verständnis im Buchkontext notwendig ist.
Länge:
- So knapp wie möglich, so ausführlich wie nötig. Einfache Bilder: ca. 140 Zeichen. Komplexe Bilder: ausführlicher.
Atmosphäre/Stimmung nur beschreiben, wenn sie für das Verständnis wichtig ist.

FINALES AUSGABEFORMAT (genau so, ohne Zusätze):

KURZBESCHREIBUNG (max. 140 Zeichen): [Prägnante, eigenständige Kurzbeschreibung, strikt innerhalb von 140 Zeichen.]
---
LANGBESCHREIBUNG: [Detaillierte, erweiterte Beschreibung ohne Längenbeschränkung.]
"#;

/// Build the accessibility prompt for an image in the given book context.
///
/// Blank context falls back to [`DEFAULT_BOOK_CONTEXT`].
pub fn accessibility_prompt(book_context: Option<&str>) -> String {
    let context = book_context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_BOOK_CONTEXT);
    ACCESSIBILITY_TEMPLATE.replace(CONTEXT_PLACEHOLDER, context)
}
