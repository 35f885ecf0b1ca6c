//! Locale, theme and interface strings
//!
//! The locale is the first path segment of every console route
//! (`/uz/books`, `/ru/catalog`). Interface strings are a closed [`Message`]
//! enum so a missing translation is a compile error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

// ============================================================================
// Locale
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Uz,
    Ru,
    En,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::Uz, Locale::Ru, Locale::En];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::Uz => "uz",
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }

    /// Native name for the language switcher
    pub fn label(&self) -> &'static str {
        match self {
            Locale::Uz => "O'zbekcha",
            Locale::Ru => "Русский",
            Locale::En => "English",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(code))
    }

    /// Split `/ru/books/3` into the locale and the remaining path `/books/3`
    pub fn split_path(path: &str) -> (Option<Self>, String) {
        let trimmed = path.trim_start_matches('/');
        let (first, rest) = trimmed.split_once('/').unwrap_or((trimmed, ""));
        match Self::from_code(first) {
            Some(locale) => (Some(locale), format!("/{}", rest)),
            None => (None, format!("/{}", trimmed)),
        }
    }

    /// Prefix a locale-free path with this locale
    pub fn path(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("/{}", self.code())
        } else {
            format!("/{}/{}", self.code(), path)
        }
    }

    /// Same page in another locale
    pub fn switch_path(&self, current: &str) -> String {
        let (_, rest) = Self::split_path(current);
        self.path(&rest)
    }

    pub fn t(&self, message: Message) -> &'static str {
        message.text(*self)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::from_code(s).ok_or_else(|| Error::Other(format!("unsupported locale: {}", s)))
    }
}

// ============================================================================
// Theme
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
            Theme::System => Theme::Light,
        }
    }

    /// Whether the dark palette applies, given the OS preference
    pub fn is_dark(&self, prefers_dark: bool) -> bool {
        match self {
            Theme::Light => false,
            Theme::Dark => true,
            Theme::System => prefers_dark,
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Interface strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    Dashboard,
    Books,
    Categories,
    Bookings,
    Students,
    Administrators,
    Notifications,
    Profile,
    Catalog,
    Login,
    Logout,
    Phone,
    Password,
    Search,
    Filter,
    Columns,
    NoData,
    Loading,
    Create,
    Edit,
    Delete,
    Save,
    Cancel,
    Submit,
    Next,
    Back,
    Undo,
    Redo,
    Reset,
    Saved,
    Approve,
    Reject,
    Return,
    Download,
    Export,
    Copies,
    ConfirmDelete,
    Unauthorized,
    InvalidCredentials,
    NotFound,
    RowsPerPage,
    Forbidden,
    Deleted,
    Actions,
    All,
    Yes,
    No,
    Title,
    Author,
    Category,
    Isbn,
    Language,
    Publisher,
    PublishedYear,
    PageCount,
    TotalCopies,
    AvailableCopies,
    Description,
    Cover,
    PdfFile,
    Downloadable,
    MainInfo,
    Details,
    Files,
    Name,
    BookCount,
    FullName,
    StudentId,
    Faculty,
    Group,
    Course,
    Active,
    Role,
    Status,
    CreatedAt,
    DueDate,
    Student,
    Book,
    Reason,
    MarkRead,
    Body,
    InventoryNumber,
    Condition,
    Location,
    TotalBooks,
    TotalStudents,
    ActiveBookings,
    PendingBookings,
    OverdueBookings,
    MonthlyActivity,
    Returns,
    ByCategory,
}

impl Message {
    pub fn text(&self, locale: Locale) -> &'static str {
        use Message::*;
        let [uz, ru, en] = match self {
            Dashboard => ["Boshqaruv paneli", "Панель управления", "Dashboard"],
            Books => ["Kitoblar", "Книги", "Books"],
            Categories => ["Kategoriyalar", "Категории", "Categories"],
            Bookings => ["Buyurtmalar", "Бронирования", "Bookings"],
            Students => ["Talabalar", "Студенты", "Students"],
            Administrators => ["Administratorlar", "Администраторы", "Administrators"],
            Notifications => ["Bildirishnomalar", "Уведомления", "Notifications"],
            Profile => ["Profil", "Профиль", "Profile"],
            Catalog => ["Katalog", "Каталог", "Catalog"],
            Login => ["Kirish", "Войти", "Sign in"],
            Logout => ["Chiqish", "Выйти", "Sign out"],
            Phone => ["Telefon", "Телефон", "Phone"],
            Password => ["Parol", "Пароль", "Password"],
            Search => ["Qidirish...", "Поиск...", "Search..."],
            Filter => ["Filtr", "Фильтр", "Filter"],
            Columns => ["Ustunlar", "Столбцы", "Columns"],
            NoData => ["Ma'lumot topilmadi", "Нет данных", "No data"],
            Loading => ["Yuklanmoqda...", "Загрузка...", "Loading..."],
            Create => ["Qo'shish", "Добавить", "Create"],
            Edit => ["Tahrirlash", "Редактировать", "Edit"],
            Delete => ["O'chirish", "Удалить", "Delete"],
            Save => ["Saqlash", "Сохранить", "Save"],
            Cancel => ["Bekor qilish", "Отмена", "Cancel"],
            Submit => ["Yuborish", "Отправить", "Submit"],
            Next => ["Keyingi", "Далее", "Next"],
            Back => ["Orqaga", "Назад", "Back"],
            Undo => ["Bekor qilish", "Отменить", "Undo"],
            Redo => ["Qaytarish", "Повторить", "Redo"],
            Reset => ["Tozalash", "Сбросить", "Reset"],
            Saved => ["Saqlandi", "Сохранено", "Saved"],
            Approve => ["Tasdiqlash", "Одобрить", "Approve"],
            Reject => ["Rad etish", "Отклонить", "Reject"],
            Return => ["Qaytarildi", "Возвращена", "Returned"],
            Download => ["Yuklab olish", "Скачать", "Download"],
            Export => ["Eksport", "Экспорт", "Export"],
            Copies => ["Nusxalar", "Экземпляры", "Copies"],
            ConfirmDelete => [
                "Haqiqatan ham o'chirmoqchimisiz?",
                "Вы уверены, что хотите удалить?",
                "Are you sure you want to delete this?",
            ],
            InvalidCredentials => [
                "Telefon raqami yoki parol noto'g'ri",
                "Неверный телефон или пароль",
                "Invalid phone number or password",
            ],
            Unauthorized => [
                "Sessiya muddati tugadi, qayta kiring",
                "Сессия истекла, войдите снова",
                "Session expired, please sign in again",
            ],
            NotFound => ["Sahifa topilmadi", "Страница не найдена", "Page not found"],
            RowsPerPage => ["Sahifada", "На странице", "Rows per page"],
            Forbidden => ["Bu bo'limga ruxsat yo'q", "Нет доступа к этому разделу", "You do not have access to this page"],
            Deleted => ["O'chirildi", "Удалено", "Deleted"],
            Actions => ["Amallar", "Действия", "Actions"],
            All => ["Barchasi", "Все", "All"],
            Yes => ["Ha", "Да", "Yes"],
            No => ["Yo'q", "Нет", "No"],
            Title => ["Nomi", "Название", "Title"],
            Author => ["Muallif", "Автор", "Author"],
            Category => ["Kategoriya", "Категория", "Category"],
            Isbn => ["ISBN", "ISBN", "ISBN"],
            Language => ["Til", "Язык", "Language"],
            Publisher => ["Nashriyot", "Издательство", "Publisher"],
            PublishedYear => ["Nashr yili", "Год издания", "Year"],
            PageCount => ["Sahifalar", "Страниц", "Pages"],
            TotalCopies => ["Nusxalar soni", "Всего экземпляров", "Total copies"],
            AvailableCopies => ["Mavjud", "Доступно", "Available"],
            Description => ["Tavsif", "Описание", "Description"],
            Cover => ["Muqova", "Обложка", "Cover"],
            PdfFile => ["PDF fayl", "PDF файл", "PDF file"],
            Downloadable => ["Yuklab olish mumkin", "Доступна для скачивания", "Downloadable"],
            MainInfo => ["Asosiy", "Основное", "Main"],
            Details => ["Tafsilotlar", "Подробности", "Details"],
            Files => ["Fayllar", "Файлы", "Files"],
            Name => ["Nomi", "Название", "Name"],
            BookCount => ["Kitoblar soni", "Количество книг", "Books"],
            FullName => ["F.I.Sh.", "Ф.И.О.", "Full name"],
            StudentId => ["Talaba ID", "Студенческий ID", "Student ID"],
            Faculty => ["Fakultet", "Факультет", "Faculty"],
            Group => ["Guruh", "Группа", "Group"],
            Course => ["Kurs", "Курс", "Course"],
            Active => ["Faol", "Активен", "Active"],
            Role => ["Rol", "Роль", "Role"],
            Status => ["Holati", "Статус", "Status"],
            CreatedAt => ["Yaratilgan", "Создано", "Created"],
            DueDate => ["Qaytarish muddati", "Срок возврата", "Due date"],
            Student => ["Talaba", "Студент", "Student"],
            Book => ["Kitob", "Книга", "Book"],
            Reason => ["Sabab", "Причина", "Reason"],
            MarkRead => ["O'qilgan deb belgilash", "Отметить прочитанным", "Mark as read"],
            Body => ["Matn", "Текст", "Message"],
            InventoryNumber => ["Inventar raqami", "Инвентарный номер", "Inventory no."],
            Condition => ["Holati", "Состояние", "Condition"],
            Location => ["Joylashuvi", "Расположение", "Location"],
            TotalBooks => ["Jami kitoblar", "Всего книг", "Total books"],
            TotalStudents => ["Jami talabalar", "Всего студентов", "Total students"],
            ActiveBookings => ["Faol buyurtmalar", "Активные бронирования", "Active bookings"],
            PendingBookings => ["Kutilmoqda", "Ожидают", "Pending"],
            OverdueBookings => ["Muddati o'tgan", "Просрочено", "Overdue"],
            MonthlyActivity => ["Oylik faollik", "Активность по месяцам", "Monthly activity"],
            Returns => ["Qaytarilganlar", "Возвраты", "Returns"],
            ByCategory => ["Kategoriyalar bo'yicha", "По категориям", "By category"],
        };
        match locale {
            Locale::Uz => uz,
            Locale::Ru => ru,
            Locale::En => en,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_codes() {
        assert_eq!(Locale::from_code("RU"), Some(Locale::Ru));
        assert_eq!(Locale::from_code("de"), None);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!(Locale::default(), Locale::Uz);
    }

    #[test]
    fn test_split_path() {
        assert_eq!(
            Locale::split_path("/ru/books/3"),
            (Some(Locale::Ru), "/books/3".to_string())
        );
        assert_eq!(Locale::split_path("/uz"), (Some(Locale::Uz), "/".to_string()));
        assert_eq!(Locale::split_path("/books"), (None, "/books".to_string()));
    }

    #[test]
    fn test_localized_paths() {
        assert_eq!(Locale::En.path("/books"), "/en/books");
        assert_eq!(Locale::En.path(""), "/en");
        assert_eq!(Locale::Ru.switch_path("/uz/bookings"), "/ru/bookings");
    }

    #[test]
    fn test_theme_cycle() {
        assert_eq!(Theme::default(), Theme::System);
        assert_eq!(Theme::Light.next(), Theme::Dark);
        assert!(Theme::System.is_dark(true));
        assert!(!Theme::Light.is_dark(true));
    }

    #[test]
    fn test_messages() {
        assert_eq!(Locale::En.t(Message::NoData), "No data");
        assert_eq!(Message::Books.text(Locale::Ru), "Книги");
        assert_eq!(Message::MarkRead.text(Locale::Uz), "O'qilgan deb belgilash");
    }
}
