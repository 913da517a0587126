//! Message catalog and keyboard rendering
//!
//! Turns the state machine's semantic prompts into localized text plus an
//! inline keyboard. Keyboards always carry the callback vocabulary from
//! `state_machine::event::Button`, so every button a user can press parses
//! back into an event.

use crate::backend::types::Role;
use crate::state_machine::effect::{MenuView, Prompt};
use crate::state_machine::event::{Button, Confirm};
use crate::state_machine::state::{Lang, PhotoSlot};
use serde::Serialize;

// ============================================================================
// Keyboards
// ============================================================================

/// One inline button: a label and the callback data it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub label: String,
    pub data: String,
}

impl KeyboardButton {
    fn new(label: impl Into<String>, button: &Button) -> Self {
        Self {
            label: label.into(),
            data: button.callback_data(),
        }
    }
}

/// Rows of inline buttons attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<KeyboardButton>>,
}

impl Keyboard {
    fn row(mut self, row: Vec<KeyboardButton>) -> Self {
        self.rows.push(row);
        self
    }
}

/// A prompt rendered for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

// ============================================================================
// Catalog
// ============================================================================

struct Catalog {
    welcome: &'static str,
    login_prompt: &'static str,
    login_btn: &'static str,
    logout_btn: &'static str,
    enter_daily_btn: &'static str,
    email_prompt: &'static str,
    email_not_found: &'static str,
    password_prompt: &'static str,
    login_success: &'static str,
    login_failed: &'static str,
    daily_already: &'static str,
    task_prompt: &'static str,
    start_btn: &'static str,
    finish_btn: &'static str,
    checkin_prompt: &'static str,
    checkout_prompt: &'static str,
    confirm_photo: &'static str,
    yes_btn: &'static str,
    no_btn: &'static str,
    cancel_btn: &'static str,
    please_send_photo: &'static str,
    new_checkin: &'static str,
    new_checkout: &'static str,
    photo_saved: &'static str,
    submission_success: &'static str,
    submission_error: &'static str,
    transient_error: &'static str,
    no_project: &'static str,
    no_tasks: &'static str,
    task_fetch_error: &'static str,
    admin_menu: &'static str,
    view_workers_btn: &'static str,
    analytics_btn: &'static str,
    back_btn: &'static str,
    worker_list: &'static str,
    no_workers: &'static str,
    worker_details: &'static str,
    daily_entries: &'static str,
    no_data: &'static str,
    error_fetching: &'static str,
    top_workers: &'static str,
    average_hours: &'static str,
    max_hours: &'static str,
}

const EN: Catalog = Catalog {
    welcome: "🌐 Welcome! Please choose your language:",
    login_prompt: "Please log in to continue:",
    login_btn: "🔐 Login",
    logout_btn: "Log Out",
    enter_daily_btn: "📝 Enter Daily Entry",
    email_prompt: "Please enter your email:",
    email_not_found: "This email doesn't exist. Please enter a valid email:",
    password_prompt: "Now, please enter your password:",
    login_success: "✅ Login successful! Welcome {email}! Your role is: {role}",
    login_failed: "❌ Login failed. Please try again.",
    daily_already: "📝 You have already submitted your daily entry for today.",
    task_prompt: "👉 Please select the task you will perform today:",
    start_btn: "🚀 Start",
    finish_btn: "✅ Finish",
    checkin_prompt: "📸 Please send your check-in photo:",
    checkout_prompt: "📸 Please send your check-out photo:",
    confirm_photo: "🤔 Is this the photo you want to send?",
    yes_btn: "👍 Yes",
    no_btn: "👎 No",
    cancel_btn: "❌ Cancel",
    please_send_photo: "Please send a photo.",
    new_checkin: "Please send a new check-in photo.",
    new_checkout: "Please send a new check-out photo.",
    photo_saved: "Photo saved.",
    submission_success: "🎉 Thank you! Your daily entry has been submitted successfully.",
    submission_error: "❌ Error submitting daily entry. Please try again.",
    transient_error: "An error occurred. Please try again.",
    no_project: "No project assigned. Contact admin.",
    no_tasks: "No tasks found for your project.",
    task_fetch_error: "Error fetching tasks. Please try again later.",
    admin_menu: "🛠 Admin Menu:",
    view_workers_btn: "👥 View Workers",
    analytics_btn: "📊 Analytics",
    back_btn: "🔙 Back",
    worker_list: "Worker List:",
    no_workers: "No workers found.",
    worker_details: "Worker Details:",
    daily_entries: "Daily Entries:",
    no_data: "No data available.",
    error_fetching: "Error fetching data.",
    top_workers: "🏆 Top 10 Workers:",
    average_hours: "Average Hours:",
    max_hours: "Max Hours:",
};

const RU: Catalog = Catalog {
    welcome: "Привет! 👋🏻 Пожалуйста, выбери язык 🌍💬:",
    login_prompt: "Пожалуйста, войди, чтобы продолжить:",
    login_btn: "🔐 Войти",
    logout_btn: "Выйти",
    enter_daily_btn: "📝 Отправить ежедневный отчёт",
    email_prompt: "Пожалуйста, введи свою почту:",
    email_not_found: "Такого email нет. Введи, пожалуйста, корректный email:",
    password_prompt: "Теперь введи свой пароль:",
    login_success: "✅ Успешный вход! Привет, {email}! Твоя роль: {role}",
    login_failed: "❌ Ошибка входа. Попробуй ещё раз.",
    daily_already: "📝 Ты уже отправил ежедневный отчёт сегодня.",
    task_prompt: "👉 Выбери задачу, которую будешь выполнять сегодня:",
    start_btn: "🚀 Начать",
    finish_btn: "✅ Закончить",
    checkin_prompt: "Отправь, пожалуйста, фото своего рабочего места 🏗👷",
    checkout_prompt: "Отправь, пожалуйста, фото своего рабочего места 🏗👷",
    confirm_photo: "🤔 Это фото, которое хочешь отправить?",
    yes_btn: "👍 Да",
    no_btn: "👎 Нет",
    cancel_btn: "❌ Отмена",
    please_send_photo: "Пожалуйста, пришли фото.",
    new_checkin: "Пришли новое фото для входа.",
    new_checkout: "Пришли новое фото для выхода.",
    photo_saved: "Фото сохранено.",
    submission_success: "🎉 Спасибо! Ежедневный отчёт успешно отправлен.",
    submission_error: "❌ Ошибка отправки отчёта. Попробуй ещё раз.",
    transient_error: "Произошла ошибка. Попробуй ещё раз.",
    no_project: "Проект не назначен. Обратись к администратору.",
    no_tasks: "Для твоего проекта задач не найдено.",
    task_fetch_error: "Ошибка загрузки задач. Попробуй позже.",
    admin_menu: "🛠 Админ меню:",
    view_workers_btn: "👥 Рабочие",
    analytics_btn: "📊 Аналитика",
    back_btn: "🔙 Назад",
    worker_list: "Список рабочих:",
    no_workers: "Рабочих не найдено.",
    worker_details: "Детали рабочего:",
    daily_entries: "Отчёты:",
    no_data: "Нет данных.",
    error_fetching: "Ошибка получения данных.",
    top_workers: "🏆 Лучшие рабочие (топ-10):",
    average_hours: "Среднее время:",
    max_hours: "Максимальное время:",
};

const KY: Catalog = Catalog {
    welcome: "Салам! 👋🏻 Сураныч, тилиңизди тандаңыз:",
    login_prompt: "Сураныч, кирип улантыңыз:",
    login_btn: "🔐 Кирүү",
    logout_btn: "Чыгуу",
    enter_daily_btn: "📝 Күнүмдүк эсеп жөнөтүү",
    email_prompt: "Электрондук почтаңызды жазыңыз:",
    email_not_found: "Мындай email жок. Туура email жазыңыз:",
    password_prompt: "Эми сырсөзүңүздү жазыңыз:",
    login_success: "✅ Кирүү ийгиликтүү! {email} – кош келдиң, ролуң: {role}",
    login_failed: "❌ Кирүүдө ката. Кайра аракет кылыңыз.",
    daily_already: "📝 Бүгүн күнүмдүк эсеп жөнөтүлгөн.",
    task_prompt: "👉 Бүгүн кандай тапшырманы аткарганыңызды тандаңыз:",
    start_btn: "🚀 Баштоо",
    finish_btn: "✅ Аяктоо",
    checkin_prompt: "📸 Кирүү үчүн фото жибериңиз:",
    checkout_prompt: "📸 Чыгуу үчүн фото жибериңиз:",
    confirm_photo: "🤔 Бул сиз жөнөтүүчү фотобу?",
    yes_btn: "👍 Ооба",
    no_btn: "👎 Жок",
    cancel_btn: "❌ Баш тартуу",
    please_send_photo: "Сураныч, фото жибериңиз.",
    new_checkin: "Жаңы кирүү фото жибериңиз.",
    new_checkout: "Жаңы чыгуу фото жибериңиз.",
    photo_saved: "Фото сакталды.",
    submission_success: "🎉 Рахмат! Күнүмдүк эсеп ийгиликтүү жөнөтүлдү.",
    submission_error: "❌ Ката. Күнүмдүк эсеп жөнөтүлгөн жок. Кайра аракет кылыңыз.",
    transient_error: "Ката кетти. Кайра аракет кылыңыз.",
    no_project: "Долбоор дайындалган эмес. Админге кайрылыңыз.",
    no_tasks: "Долбооруңуз үчүн тапшырмалар табылган жок.",
    task_fetch_error: "Тапшырмаларды жүктөөдө ката. Кийинчерээк аракет кылыңыз.",
    admin_menu: "🛠 Админ меню:",
    view_workers_btn: "👥 Ишчилер",
    analytics_btn: "📊 Аналитика",
    back_btn: "🔙 Артка",
    worker_list: "Ишчилер тизмеси:",
    no_workers: "Ишчилер табылган жок.",
    worker_details: "Ишчинин маалыматтары:",
    daily_entries: "Күнүмдүк эсептер:",
    no_data: "Даналар жок.",
    error_fetching: "Маалыматтарды алууда ката.",
    top_workers: "Эң мыкты ишчилер 10:",
    average_hours: "Орточо убакыт:",
    max_hours: "Эң көп убакыт:",
};

const KK: Catalog = Catalog {
    welcome: "Сәлем! 👋🏻 Тілді таңдаңыз:",
    login_prompt: "Кіріп, жалғастырыңыз:",
    login_btn: "🔐 Кіру",
    logout_btn: "Шығу",
    enter_daily_btn: "📝 Күнделікті есепті енгізу",
    email_prompt: "Электрондық поштаңызды енгізіңіз:",
    email_not_found: "Мұндай email жоқ. Дұрыс email енгізіңіз:",
    password_prompt: "Енді, құпия сөзіңізді енгізіңіз:",
    login_success: "✅ Кіру сәтті! {email} – қош келдіңіз, рөліңіз: {role}",
    login_failed: "❌ Кіру кезінде қате. Қайта көріңіз.",
    daily_already: "📝 Бүгін күнделікті есеп енгізілген.",
    task_prompt: "👉 Бүгін қандай тапсырманы орындауыңызды таңдаңыз:",
    start_btn: "🚀 Бастау",
    finish_btn: "✅ Аяқтау",
    checkin_prompt: "📸 Кірген кездегі фотоны жіберіңіз:",
    checkout_prompt: "📸 Шыққан кездегі фотоны жіберіңіз:",
    confirm_photo: "🤔 Бұл сіз жібергіңіз келетін фото ма?",
    yes_btn: "👍 Иә",
    no_btn: "👎 Жоқ",
    cancel_btn: "❌ Бас тарту",
    please_send_photo: "Фото жіберіңіз.",
    new_checkin: "Жаңа кірген кездегі фото жіберіңіз.",
    new_checkout: "Жаңа шыққан кездегі фото жіберіңіз.",
    photo_saved: "Фото сақталды.",
    submission_success: "🎉 Рақмет! Күнделікті есеп сәтті жіберілді.",
    submission_error: "❌ Қате. Есеп жіберілген жоқ. Қайта көріңіз.",
    transient_error: "Қате болды. Қайта көріңіз.",
    no_project: "Жоба тағайындалмаған. Админге хабарласыңыз.",
    no_tasks: "Жобаңыз үшін тапсырмалар табылмады.",
    task_fetch_error: "Тапсырмаларды жүктеуде қате. Кейінірек көріңіз.",
    admin_menu: "🛠 Админ меню:",
    view_workers_btn: "👥 Қызметкерлер",
    analytics_btn: "📊 Аналитика",
    back_btn: "🔙 Артқа",
    worker_list: "Қызметкерлер тізімі:",
    no_workers: "Қызметкерлер табылмады.",
    worker_details: "Қызметкердің деректері:",
    daily_entries: "Күнделікті есептер:",
    no_data: "Деректер жоқ.",
    error_fetching: "Деректерді алуда қате.",
    top_workers: "Ең үздік қызметкерлер: 10",
    average_hours: "Орташа уақыт:",
    max_hours: "Ең көп уақыт:",
};

fn catalog(lang: Lang) -> &'static Catalog {
    match lang {
        Lang::En => &EN,
        Lang::Ru => &RU,
        Lang::Ky => &KY,
        Lang::Kk => &KK,
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn language_keyboard() -> Keyboard {
    Keyboard::default()
        .row(vec![
            KeyboardButton::new("🇬🇧 English", &Button::Lang(Lang::En)),
            KeyboardButton::new("🇷🇺 Русский", &Button::Lang(Lang::Ru)),
        ])
        .row(vec![
            KeyboardButton::new("🇰🇬 Кыргызча", &Button::Lang(Lang::Ky)),
            KeyboardButton::new("🇰🇿 Қазақша", &Button::Lang(Lang::Kk)),
        ])
}

fn cancel_row(t: &Catalog) -> Vec<KeyboardButton> {
    vec![KeyboardButton::new(t.cancel_btn, &Button::Cancel)]
}

fn login_success_line(t: &Catalog, email: &str, role: &Role) -> String {
    t.login_success
        .replace("{email}", email)
        .replace("{role}", role.label())
}

fn text_only(text: &str) -> Rendered {
    Rendered {
        text: text.to_string(),
        keyboard: None,
    }
}

/// Render a prompt for the given language.
#[allow(clippy::too_many_lines)]
pub fn render(prompt: &Prompt, lang: Lang) -> Rendered {
    let t = catalog(lang);
    match prompt {
        Prompt::Welcome => Rendered {
            text: t.welcome.to_string(),
            keyboard: Some(language_keyboard()),
        },

        Prompt::LoginGate => Rendered {
            text: t.login_prompt.to_string(),
            keyboard: Some(
                Keyboard::default().row(vec![KeyboardButton::new(t.login_btn, &Button::Login)]),
            ),
        },

        Prompt::EmailPrompt => Rendered {
            text: t.email_prompt.to_string(),
            keyboard: Some(Keyboard::default().row(cancel_row(t))),
        },

        Prompt::EmailNotFound => text_only(t.email_not_found),
        Prompt::TransientError => text_only(t.transient_error),

        Prompt::PasswordPrompt => Rendered {
            text: t.password_prompt.to_string(),
            keyboard: Some(Keyboard::default().row(cancel_row(t))),
        },

        Prompt::LoginFailed => text_only(t.login_failed),

        Prompt::Menu(MenuView::Worker {
            email,
            role,
            entry_exists,
        }) => {
            let mut text = login_success_line(t, email, role);
            let mut keyboard = Keyboard::default();
            if *entry_exists {
                text.push_str("\n\n");
                text.push_str(t.daily_already);
            } else {
                keyboard = keyboard.row(vec![KeyboardButton::new(
                    t.enter_daily_btn,
                    &Button::EnterDailyEntry,
                )]);
            }
            keyboard = keyboard.row(vec![KeyboardButton::new(t.logout_btn, &Button::Logout)]);
            Rendered {
                text,
                keyboard: Some(keyboard),
            }
        }

        Prompt::Menu(MenuView::Admin { email }) => {
            let mut text = login_success_line(t, email, &Role::Admin);
            text.push_str("\n\n");
            text.push_str(t.admin_menu);
            let keyboard = Keyboard::default()
                .row(vec![KeyboardButton::new(
                    t.view_workers_btn,
                    &Button::AdminViewWorkers,
                )])
                .row(vec![KeyboardButton::new(
                    t.analytics_btn,
                    &Button::AdminAnalytics,
                )])
                .row(vec![KeyboardButton::new(t.logout_btn, &Button::Logout)]);
            Rendered {
                text,
                keyboard: Some(keyboard),
            }
        }

        Prompt::NoProject => text_only(t.no_project),

        Prompt::TaskList { tasks } => {
            let mut keyboard = Keyboard::default();
            for task in tasks {
                keyboard = keyboard.row(vec![KeyboardButton::new(
                    task.name.clone(),
                    &Button::Task(task.id),
                )]);
            }
            keyboard = keyboard.row(cancel_row(t));
            Rendered {
                text: t.task_prompt.to_string(),
                keyboard: Some(keyboard),
            }
        }

        Prompt::NoTasks => text_only(t.no_tasks),
        Prompt::TaskFetchError => text_only(t.task_fetch_error),

        Prompt::PressStart => Rendered {
            text: t.start_btn.to_string(),
            keyboard: Some(
                Keyboard::default()
                    .row(vec![KeyboardButton::new(t.start_btn, &Button::StartTask)])
                    .row(cancel_row(t)),
            ),
        },

        Prompt::CheckinPrompt => Rendered {
            text: t.checkin_prompt.to_string(),
            keyboard: Some(Keyboard::default().row(cancel_row(t))),
        },

        Prompt::CheckoutPrompt => Rendered {
            text: t.checkout_prompt.to_string(),
            keyboard: Some(Keyboard::default().row(cancel_row(t))),
        },

        Prompt::PleaseSendPhoto => text_only(t.please_send_photo),

        Prompt::ConfirmPhoto { slot } => {
            let (yes, no) = match slot {
                PhotoSlot::CheckIn => (
                    Button::ConfirmCheckin(Confirm::Yes),
                    Button::ConfirmCheckin(Confirm::No),
                ),
                PhotoSlot::CheckOut => (
                    Button::ConfirmCheckout(Confirm::Yes),
                    Button::ConfirmCheckout(Confirm::No),
                ),
            };
            let keyboard = Keyboard::default()
                .row(vec![
                    KeyboardButton::new(t.yes_btn, &yes),
                    KeyboardButton::new(t.no_btn, &no),
                ])
                .row(cancel_row(t));
            Rendered {
                text: t.confirm_photo.to_string(),
                keyboard: Some(keyboard),
            }
        }

        Prompt::PhotoSaved => Rendered {
            text: t.photo_saved.to_string(),
            keyboard: Some(
                Keyboard::default()
                    .row(vec![KeyboardButton::new(t.finish_btn, &Button::FinishTask)])
                    .row(cancel_row(t)),
            ),
        },

        Prompt::NewCheckinPhoto => text_only(t.new_checkin),
        Prompt::NewCheckoutPhoto => text_only(t.new_checkout),
        Prompt::SubmissionSuccess => text_only(t.submission_success),
        Prompt::SubmissionError => text_only(t.submission_error),

        Prompt::WorkerList { workers } => {
            let mut keyboard = Keyboard::default();
            for worker in workers {
                keyboard = keyboard.row(vec![KeyboardButton::new(
                    worker.email.clone(),
                    &Button::Worker(worker.id),
                )]);
            }
            keyboard = keyboard.row(vec![KeyboardButton::new(t.back_btn, &Button::AdminBack)]);
            Rendered {
                text: t.worker_list.to_string(),
                keyboard: Some(keyboard),
            }
        }

        Prompt::NoWorkers => text_only(t.no_workers),

        Prompt::WorkerDetails { details } => {
            let mut text = format!("{}\n", t.worker_details);
            text.push_str(&format!("Email: {}\n", details.worker.email));
            text.push_str(&format!("Total Entries: {}\n", details.entries.len()));
            if details.entries.is_empty() {
                text.push_str(t.no_data);
            } else {
                text.push_str(t.daily_entries);
                text.push('\n');
                for entry in &details.entries {
                    text.push_str(&format!(
                        "- Date: {}, Hours: {}\n",
                        entry.date, entry.hours_worked
                    ));
                }
            }
            Rendered {
                text,
                keyboard: Some(
                    Keyboard::default()
                        .row(vec![KeyboardButton::new(t.back_btn, &Button::AdminBack)]),
                ),
            }
        }

        Prompt::Analytics { report } => {
            let mut text = format!("{} 📊\n", t.analytics_btn);
            text.push_str(&format!(
                "{} 📈 {:.2}\n",
                t.average_hours, report.average_hours
            ));
            text.push_str(&format!("{} 📉 {:.2}\n", t.max_hours, report.max_hours));
            if report.top_workers.is_empty() {
                text.push_str(t.no_data);
            } else {
                text.push_str(t.top_workers);
                text.push('\n');
                for worker in &report.top_workers {
                    text.push_str(&format!("{}: {:.2}\n", worker.email, worker.total_hours));
                }
            }
            Rendered {
                text,
                keyboard: Some(
                    Keyboard::default()
                        .row(vec![KeyboardButton::new(t.back_btn, &Button::AdminBack)]),
                ),
            }
        }

        Prompt::AdminFetchError => text_only(t.error_fetching),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_prompt_renders_in_every_language() {
        let prompts = [
            Prompt::Welcome,
            Prompt::LoginGate,
            Prompt::EmailPrompt,
            Prompt::EmailNotFound,
            Prompt::TransientError,
            Prompt::PasswordPrompt,
            Prompt::LoginFailed,
            Prompt::NoProject,
            Prompt::NoTasks,
            Prompt::TaskFetchError,
            Prompt::PressStart,
            Prompt::CheckinPrompt,
            Prompt::CheckoutPrompt,
            Prompt::PleaseSendPhoto,
            Prompt::PhotoSaved,
            Prompt::NewCheckinPhoto,
            Prompt::NewCheckoutPhoto,
            Prompt::SubmissionSuccess,
            Prompt::SubmissionError,
            Prompt::NoWorkers,
            Prompt::AdminFetchError,
        ];
        for lang in [Lang::En, Lang::Ru, Lang::Ky, Lang::Kk] {
            for prompt in &prompts {
                assert!(!render(prompt, lang).text.is_empty());
            }
        }
    }

    #[test]
    fn menu_with_existing_entry_offers_logout_only() {
        let rendered = render(
            &Prompt::Menu(MenuView::Worker {
                email: "worker@site.example".to_string(),
                role: Role::Worker,
                entry_exists: true,
            }),
            Lang::En,
        );
        let keyboard = rendered.keyboard.unwrap();
        assert_eq!(keyboard.rows.len(), 1);
        assert_eq!(keyboard.rows[0][0].data, "logout");
    }

    #[test]
    fn confirm_keyboard_matches_slot() {
        let rendered = render(
            &Prompt::ConfirmPhoto {
                slot: PhotoSlot::CheckOut,
            },
            Lang::Ru,
        );
        let keyboard = rendered.keyboard.unwrap();
        assert_eq!(keyboard.rows[0][0].data, "confirm_checkout_yes");
        assert_eq!(keyboard.rows[0][1].data, "confirm_checkout_no");
    }

    #[test]
    fn welcome_keyboard_lists_all_languages() {
        let rendered = render(&Prompt::Welcome, Lang::Ru);
        let keyboard = rendered.keyboard.unwrap();
        let data: Vec<_> = keyboard
            .rows
            .iter()
            .flatten()
            .map(|button| button.data.as_str())
            .collect();
        assert_eq!(data, vec!["en", "ru", "ky", "kk"]);
    }
}
