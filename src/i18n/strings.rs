use crate::i18n::Language;

/// User-facing strings, keyed by message and then by language.
///
/// Every message is defined once with all four translations side by side so a
/// new key cannot be added for one language and forgotten for another.
/// Placeholders use `{name}` and are filled with `str::replace` at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    // ==================== Page Titles ====================
    PageHome,
    PageConnections,
    PageJobs,
    PagePartners,
    PageProducts,
    PagePricing,
    PagePackage,
    PageContact,
    PageFaq,
    PagePrivacyPolicy,
    PageTerms,
    PageTermsSellers,
    PageLifetimeDiscount,
    PageNotFound,
    NotFoundBody,

    // ==================== Intake Validation ====================
    FieldRequired,
    EmailRequired,
    EmailInvalid,
    SellerIdRequired,
    IbanInvalid,
    BicInvalid,

    // ==================== Package Form Validation ====================
    PackageRequired,
    /// Placeholders: {min}
    CommissionRequired,
    CommissionInvalid,
    /// Placeholders: {min}, {package}
    CommissionBelowMinimum,
    SellCountriesRequired,
    PayoutFrequencyRequired,
    AgreementRequired,
    StartDateUnavailable,

    // ==================== Submission ====================
    NetworkError,
    PaymentNetworkError,
    SubmitInProgress,
}

/// One message in every supported language.
#[derive(Debug, Clone, Copy)]
pub struct Translations {
    pub en: &'static str,
    pub nl: &'static str,
    pub de: &'static str,
    pub fr: &'static str,
}

impl Translations {
    /// Pick the column for a language; unknown codes read the English column.
    pub fn pick(&self, code: &str) -> &'static str {
        match code {
            "nl" => self.nl,
            "de" => self.de,
            "fr" => self.fr,
            _ => self.en,
        }
    }
}

impl Message {
    /// Every message key, for completeness checks.
    pub const ALL: &'static [Message] = &[
        Message::PageHome,
        Message::PageConnections,
        Message::PageJobs,
        Message::PagePartners,
        Message::PageProducts,
        Message::PagePricing,
        Message::PagePackage,
        Message::PageContact,
        Message::PageFaq,
        Message::PagePrivacyPolicy,
        Message::PageTerms,
        Message::PageTermsSellers,
        Message::PageLifetimeDiscount,
        Message::PageNotFound,
        Message::NotFoundBody,
        Message::FieldRequired,
        Message::EmailRequired,
        Message::EmailInvalid,
        Message::SellerIdRequired,
        Message::IbanInvalid,
        Message::BicInvalid,
        Message::PackageRequired,
        Message::CommissionRequired,
        Message::CommissionInvalid,
        Message::CommissionBelowMinimum,
        Message::SellCountriesRequired,
        Message::PayoutFrequencyRequired,
        Message::AgreementRequired,
        Message::StartDateUnavailable,
        Message::NetworkError,
        Message::PaymentNetworkError,
        Message::SubmitInProgress,
    ];

    /// The message in the given language.
    pub fn text(self, language: Language) -> &'static str {
        self.translations().pick(language.code())
    }

    pub fn translations(self) -> Translations {
        let (en, nl, de, fr) = match self {
            Message::PageHome => ("SDeal - Sustainable marketplace", "SDeal - Duurzame marktplaats", "SDeal - Nachhaltiger Marktplatz", "SDeal - Marketplace durable"),
            Message::PageConnections => ("Connections", "Koppelingen", "Verbindungen", "Connexions"),
            Message::PageJobs => ("Jobs", "Vacatures", "Stellenangebote", "Emplois"),
            Message::PagePartners => ("Partners", "Partners", "Partner", "Partenaires"),
            Message::PageProducts => ("Products", "Producten", "Produkte", "Produits"),
            Message::PagePricing => ("Pricing", "Prijzen", "Preise", "Tarifs"),
            Message::PagePackage => ("Choose your package", "Kies je pakket", "Wählen Sie Ihr Paket", "Choisissez votre forfait"),
            Message::PageContact => ("Contact", "Contact", "Kontakt", "Contact"),
            Message::PageFaq => ("Frequently asked questions", "Veelgestelde vragen", "Häufig gestellte Fragen", "Questions fréquentes"),
            Message::PagePrivacyPolicy => ("Privacy policy", "Privacybeleid", "Datenschutzerklärung", "Politique de confidentialité"),
            Message::PageTerms => ("Terms and conditions", "Algemene voorwaarden", "Allgemeine Geschäftsbedingungen", "Conditions générales"),
            Message::PageTermsSellers => ("Terms for sellers", "Voorwaarden voor verkopers", "Bedingungen für Verkäufer", "Conditions pour les vendeurs"),
            Message::PageLifetimeDiscount => ("Lifetime Discount Group", "Levenslange Kortingsgroep", "Lebenslange Rabattgruppe", "Groupe de remise à vie"),
            Message::PageNotFound => ("Page not found", "Pagina niet gevonden", "Seite nicht gefunden", "Page introuvable"),
            Message::NotFoundBody => (
                "The page you are looking for does not exist.",
                "De pagina die je zoekt bestaat niet.",
                "Die gesuchte Seite existiert nicht.",
                "La page que vous recherchez n'existe pas.",
            ),
            Message::FieldRequired => ("This field is required", "Dit veld is verplicht", "Dieses Feld ist erforderlich", "Ce champ est obligatoire"),
            Message::EmailRequired => (
                "Please enter your email address",
                "Vul je emailadres in",
                "Bitte geben Sie Ihre E-Mail-Adresse ein",
                "Veuillez entrer votre adresse e-mail",
            ),
            Message::EmailInvalid => (
                "Please enter a valid email address",
                "Vul een geldig emailadres in",
                "Bitte geben Sie eine gültige E-Mail-Adresse ein",
                "Veuillez entrer une adresse e-mail valide",
            ),
            Message::SellerIdRequired => (
                "Please enter your seller ID",
                "Vul je verkopers-ID in",
                "Bitte geben Sie Ihre Verkäufer-ID ein",
                "Veuillez entrer votre identifiant vendeur",
            ),
            Message::IbanInvalid => (
                "Please enter a valid IBAN",
                "Vul een geldig IBAN in",
                "Bitte geben Sie eine gültige IBAN ein",
                "Veuillez entrer un IBAN valide",
            ),
            Message::BicInvalid => (
                "Please enter a valid BIC",
                "Vul een geldige BIC in",
                "Bitte geben Sie einen gültigen BIC ein",
                "Veuillez entrer un BIC valide",
            ),
            Message::PackageRequired => ("Please select a package", "Selecteer een pakket", "Bitte wählen Sie ein Paket", "Veuillez choisir un forfait"),
            Message::CommissionRequired => (
                "Please enter a commission percentage (minimum {min}%)",
                "Vul een commissiepercentage in (minimaal {min}%)",
                "Bitte geben Sie einen Provisionssatz ein (mindestens {min}%)",
                "Veuillez saisir un pourcentage de commission (minimum {min}%)",
            ),
            Message::CommissionInvalid => (
                "The commission percentage must be a number",
                "Het commissiepercentage moet een getal zijn",
                "Der Provisionssatz muss eine Zahl sein",
                "Le pourcentage de commission doit être un nombre",
            ),
            Message::CommissionBelowMinimum => (
                "Commission percentage must be at least {min}% for Package {package}",
                "Het commissiepercentage moet minimaal {min}% zijn voor Pakket {package}",
                "Der Provisionssatz muss für Paket {package} mindestens {min}% betragen",
                "Le pourcentage de commission doit être d'au moins {min}% pour le forfait {package}",
            ),
            Message::SellCountriesRequired => (
                "Select at least one country to sell in",
                "Selecteer minimaal één land om in te verkopen",
                "Wählen Sie mindestens ein Verkaufsland",
                "Sélectionnez au moins un pays de vente",
            ),
            Message::PayoutFrequencyRequired => (
                "Please choose a payout frequency",
                "Kies een uitbetalingsfrequentie",
                "Bitte wählen Sie eine Auszahlungsfrequenz",
                "Veuillez choisir une fréquence de paiement",
            ),
            Message::AgreementRequired => (
                "You must accept the agreement to continue",
                "Je moet de overeenkomst accepteren om verder te gaan",
                "Sie müssen die Vereinbarung akzeptieren, um fortzufahren",
                "Vous devez accepter le contrat pour continuer",
            ),
            Message::StartDateUnavailable => (
                "This start date is no longer available",
                "Deze startdatum is niet meer beschikbaar",
                "Dieses Startdatum ist nicht mehr verfügbar",
                "Cette date de début n'est plus disponible",
            ),
            Message::NetworkError => (
                "Failed to submit package selection. Please try again.",
                "Het versturen van je pakketkeuze is mislukt. Probeer het opnieuw.",
                "Die Paketauswahl konnte nicht gesendet werden. Bitte versuchen Sie es erneut.",
                "L'envoi de votre choix de forfait a échoué. Veuillez réessayer.",
            ),
            Message::PaymentNetworkError => (
                "Failed to create the payment. Please try again.",
                "Het aanmaken van de betaling is mislukt. Probeer het opnieuw.",
                "Die Zahlung konnte nicht erstellt werden. Bitte versuchen Sie es erneut.",
                "La création du paiement a échoué. Veuillez réessayer.",
            ),
            Message::SubmitInProgress => (
                "Your request is already being processed",
                "Je aanvraag wordt al verwerkt",
                "Ihre Anfrage wird bereits bearbeitet",
                "Votre demande est déjà en cours de traitement",
            ),
        };
        Translations { en, nl, de, fr }
    }
}
