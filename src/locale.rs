use serde::{Deserialize, Serialize};

/// Month and weekday names plus the first day of the week for one locale.
///
/// Weekday tables are Sunday first; `first_day_of_week` uses the same
/// numbering (0 = Sunday .. 6 = Saturday).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locale {
    pub code:              String,
    pub months:            [String; 12],
    pub months_short:      [String; 12],
    pub weekdays:          [String; 7],
    pub weekdays_short:    [String; 7],
    pub first_day_of_week: u32,
}

impl Locale {
    fn from_tables(
        code: &str,
        months: [&str; 12],
        months_short: [&str; 12],
        weekdays: [&str; 7],
        weekdays_short: [&str; 7],
        first_day_of_week: u32,
    ) -> Self {
        Self {
            code: code.to_owned(),
            months: months.map(str::to_owned),
            months_short: months_short.map(str::to_owned),
            weekdays: weekdays.map(str::to_owned),
            weekdays_short: weekdays_short.map(str::to_owned),
            first_day_of_week: first_day_of_week % 7,
        }
    }

    fn english() -> Self {
        Self::from_tables(
            "en",
            [
                "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
                "November", "December",
            ],
            ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"],
            ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"],
            ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            0,
        )
    }

    /// Looks up one of the bundled locales by code (`en`, `en-GB`, `de`, `fr`, `es`).
    pub fn builtin(code: &str) -> Option<Self> {
        let locale = match code {
            "en" | "en-US" => Self::english(),
            "en-GB" => Self {
                code: "en-GB".to_owned(),
                first_day_of_week: 1,
                ..Self::english()
            },
            "de" => Self::from_tables(
                "de",
                [
                    "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September", "Oktober",
                    "November", "Dezember",
                ],
                ["Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez"],
                ["Sonntag", "Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag"],
                ["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"],
                1,
            ),
            "fr" => Self::from_tables(
                "fr",
                [
                    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre", "octobre",
                    "novembre", "décembre",
                ],
                [
                    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.", "déc.",
                ],
                ["dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi"],
                ["dim.", "lun.", "mar.", "mer.", "jeu.", "ven.", "sam."],
                1,
            ),
            "es" => Self::from_tables(
                "es",
                [
                    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre", "octubre",
                    "noviembre", "diciembre",
                ],
                ["ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic"],
                ["domingo", "lunes", "martes", "miércoles", "jueves", "viernes", "sábado"],
                ["dom", "lun", "mar", "mié", "jue", "vie", "sáb"],
                1,
            ),
            _ => return None,
        };
        Some(locale)
    }

    /// Finds the 1-based month whose full or short name equals `name`, ignoring case.
    /// Full names are tried before short names.
    pub fn month_from_name(&self, name: &str) -> Option<u32> {
        let needle = name.to_lowercase();
        let find = |table: &[String; 12]| {
            table
                .iter()
                .position(|candidate| candidate.to_lowercase() == needle)
                .and_then(|idx| u32::try_from(idx + 1).ok())
        };
        find(&self.months).or_else(|| find(&self.months_short))
    }

    /// Short weekday names rotated so the first entry is `first_day_of_week`.
    pub fn weekday_headers(&self) -> Vec<&str> {
        (0..7)
            .map(|col| self.weekdays_short[(self.first_day_of_week as usize + col) % 7].as_str())
            .collect()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::english()
    }
}
