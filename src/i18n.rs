//! Static display text for the supported languages.
//!
//! Domain code passes [`Text`] keys around and only the display layer turns
//! them into strings.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::records::{Intensity, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Uz,
    Ru,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Uz => "uz",
            Language::Ru => "ru",
            Language::En => "en",
        }
    }

    /// Name of the language in that language.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Uz => "O‘zbek",
            Language::Ru => "Русский",
            Language::En => "English",
        }
    }
}

impl FromStr for Language {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uz" => Ok(Language::Uz),
            "ru" => Ok(Language::Ru),
            "en" => Ok(Language::En),
            _ => Err(ParseError {
                kind: "language",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Reminder message identifiers, one per schedule slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    StopDrinking,
    BrushTeethRelax,
    ToiletAndSleep,
    NightToilet,
    MorningCheck,
}

/// Every piece of fixed text the display layer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Text {
    Reminder(MessageKey),
    DailyQuestion,
    AnswerYes,
    AnswerNo,
    IntensityQuestion,
    IntensityLabel(Intensity),
    AdviceHeading,
    Advice(usize),
}

/// Number of treatment advice lines.
pub const ADVICE_COUNT: usize = 4;

pub fn text(language: Language, key: Text) -> &'static str {
    match language {
        Language::Uz => uzbek(key),
        Language::Ru => russian(key),
        Language::En => english(key),
    }
}

pub fn weekly_stats(language: Language, dry_days: usize) -> String {
    match language {
        Language::Uz => format!("Haftada {dry_days} kun quruq"),
        Language::Ru => format!("Сухих дней за неделю: {dry_days}"),
        Language::En => format!("Dry days this week: {dry_days}"),
    }
}

pub fn monthly_stats(language: Language, dry_days: usize) -> String {
    match language {
        Language::Uz => format!("Oyda {dry_days} kun quruq"),
        Language::Ru => format!("Сухих дней за месяц: {dry_days}"),
        Language::En => format!("Dry days this month: {dry_days}"),
    }
}

/// The treatment advice lines in display order.
pub fn advice(language: Language) -> impl Iterator<Item = &'static str> {
    (0..ADVICE_COUNT).map(move |i| text(language, Text::Advice(i)))
}

fn uzbek(key: Text) -> &'static str {
    match key {
        Text::Reminder(MessageKey::StopDrinking) => "Suv ichishni to‘xtat",
        Text::Reminder(MessageKey::BrushTeethRelax) => "Tish yuv, sokinlash",
        Text::Reminder(MessageKey::ToiletAndSleep) => "Hojatga borib uxlashga yot",
        Text::Reminder(MessageKey::NightToilet) => "Uyg‘on, hojatga bor",
        Text::Reminder(MessageKey::MorningCheck) => "Bugun quruq uyg‘ondingmi? Belgila",
        Text::DailyQuestion => "Bugun quruq uyg‘ondingmi?",
        Text::AnswerYes => "Ha",
        Text::AnswerNo => "Yo‘q",
        Text::IntensityQuestion => "Bugun holat qanchalik edi?",
        Text::IntensityLabel(Intensity::Alot) => "Juda ko‘p (3+ marta)",
        Text::IntensityLabel(Intensity::Moderate) => "O‘rtacha (1-2 marta)",
        Text::IntensityLabel(Intensity::Little) => "Kam (1 marta yoki ozgina)",
        Text::IntensityLabel(Intensity::None) => "Umuman yo‘q (quruq)",
        Text::AdviceHeading => "Davo Usullari",
        Text::Advice(0) => {
            "1. Kegel mashqlari: Har kuni 5 daqiqa siydik ushlash mushaklarini mashq qiling."
        }
        Text::Advice(1) => "2. Stressni boshqarish: Meditatsiya va nafas olish mashqlari.",
        Text::Advice(2) => "3. Uyqu tartibi: Ekran vaqtini kamaytiring, issiq vanna qabul qiling.",
        Text::Advice(_) => "4. Ovqatlanish: Kechasi kofein va shirin ichimliklardan voz kechish.",
    }
}

fn russian(key: Text) -> &'static str {
    match key {
        Text::Reminder(MessageKey::StopDrinking) => "Прекрати пить воду",
        Text::Reminder(MessageKey::BrushTeethRelax) => "Почисти зубы, расслабься",
        Text::Reminder(MessageKey::ToiletAndSleep) => "Сходи в туалет и ложись спать",
        Text::Reminder(MessageKey::NightToilet) => "Проснись, сходи в туалет",
        Text::Reminder(MessageKey::MorningCheck) => "Ты проснулся сухим сегодня? Отметь",
        Text::DailyQuestion => "Ты проснулся сухим сегодня?",
        Text::AnswerYes => "Да",
        Text::AnswerNo => "Нет",
        Text::IntensityQuestion => "Насколько сильно было сегодня?",
        Text::IntensityLabel(Intensity::Alot) => "Очень много (3+ раза)",
        Text::IntensityLabel(Intensity::Moderate) => "Умеренно (1-2 раза)",
        Text::IntensityLabel(Intensity::Little) => "Мало (1 раз или чуть-чуть)",
        Text::IntensityLabel(Intensity::None) => "Совсем нет (сухо)",
        Text::AdviceHeading => "Методы лечения",
        Text::Advice(0) => "1. Упражнения Кегеля: 5 минут в день для укрепления мышц.",
        Text::Advice(1) => "2. Управление стрессом: медитация и дыхательные упражнения.",
        Text::Advice(2) => "3. Режим сна: меньше времени у экрана, тёплая ванна.",
        Text::Advice(_) => "4. Питание: избегайте кофеина и сладких напитков на ночь.",
    }
}

fn english(key: Text) -> &'static str {
    match key {
        Text::Reminder(MessageKey::StopDrinking) => "Stop drinking water",
        Text::Reminder(MessageKey::BrushTeethRelax) => "Brush teeth, relax",
        Text::Reminder(MessageKey::ToiletAndSleep) => "Go to toilet and sleep",
        Text::Reminder(MessageKey::NightToilet) => "Wake up, go to toilet",
        Text::Reminder(MessageKey::MorningCheck) => "Did you wake up dry today? Mark",
        Text::DailyQuestion => "Did you wake up dry today?",
        Text::AnswerYes => "Yes",
        Text::AnswerNo => "No",
        Text::IntensityQuestion => "How intense was it today?",
        Text::IntensityLabel(Intensity::Alot) => "A lot (3+ times)",
        Text::IntensityLabel(Intensity::Moderate) => "Moderate (1-2 times)",
        Text::IntensityLabel(Intensity::Little) => "Little (1 time or slightly)",
        Text::IntensityLabel(Intensity::None) => "None (dry)",
        Text::AdviceHeading => "Treatment Methods",
        Text::Advice(0) => "1. Kegel exercises: 5 minutes daily to strengthen muscles.",
        Text::Advice(1) => "2. Stress management: Meditation and breathing exercises.",
        Text::Advice(2) => "3. Sleep routine: Reduce screen time, take a warm bath.",
        Text::Advice(_) => "4. Diet: Avoid caffeine and sugary drinks at night.",
    }
}
